//! API routes module

pub mod schedule;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Suggest and book routes
        .nest("/schedule", schedule::router())
}
