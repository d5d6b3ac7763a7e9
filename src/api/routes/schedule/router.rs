//! Router for the schedule API

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

async fn suggest_handler(
    State(state): State<SharedState>,
    Json(body): Json<public::SuggestRequest>,
) -> Result<Json<public::Suggestions>, ApiError> {
    let suggestions = state.agent.handle_request(&body.text).await?;
    Ok(Json(suggestions))
}

async fn book_handler(
    State(state): State<SharedState>,
    Json(body): Json<public::BookRequest>,
) -> Result<Json<public::CalendarEvent>, ApiError> {
    let event = state
        .agent
        .create_event_from_slot(&body.request, body.start)
        .await?;
    Ok(Json(event))
}

/// Create the schedule router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/suggest", post(suggest_handler))
        .route("/book", post(book_handler))
}
