//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::scheduler::ScheduleError;

// Errors

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response. Calendar
/// failures are the provider's fault rather than ours so they map to a
/// bad gateway with the provider detail in the body. Requests that
/// can't become an event are the caller's fault.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{:#}", self.0);

        if let Some(err) = self.0.downcast_ref::<ScheduleError>() {
            let status = match err {
                ScheduleError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ScheduleError::CalendarQuery(_) | ScheduleError::Booking(_) => {
                    StatusCode::BAD_GATEWAY
                }
            };
            return (status, err.to_string()).into_response();
        }

        // Respond with an error status
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod schedule {
    pub use crate::api::routes::schedule::public::*;
}
