//! Public types for the schedule API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::scheduler::{CalendarEvent, MeetingRequest, Suggestions};

#[derive(Serialize, Deserialize)]
pub struct SuggestRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct BookRequest {
    pub request: MeetingRequest,
    pub start: DateTime<Utc>,
}
