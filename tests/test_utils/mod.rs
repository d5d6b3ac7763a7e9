//! Test utilities for integration tests
use std::sync::{Arc, Mutex};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use chrono::{DateTime, Utc};

use meeting_scheduler::ai::intent::{IntentParser, TextService};
use meeting_scheduler::api::{AppState, app};
use meeting_scheduler::scheduler::{
    BusyInterval, CalendarEvent, CalendarProvider, MeetingAgent, NewEvent,
};

/// Answers every prompt with the same text.
pub struct CannedText(pub String);

#[async_trait]
impl TextService for CannedText {
    async fn complete(&self, _prompt: &str) -> Result<String, Error> {
        Ok(self.0.clone())
    }
}

/// In memory calendar that records what gets booked.
#[derive(Clone, Default)]
pub struct FakeCalendar {
    pub busy: Vec<BusyInterval>,
    pub query_error: Option<String>,
    pub create_error: Option<String>,
    pub created: Arc<Mutex<Vec<NewEvent>>>,
}

#[async_trait]
impl CalendarProvider for FakeCalendar {
    async fn busy_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Error> {
        if let Some(err) = &self.query_error {
            return Err(anyhow!(err.clone()));
        }
        Ok(self
            .busy
            .iter()
            .filter(|b| b.overlaps(start, end))
            .cloned()
            .collect())
    }

    async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, Error> {
        if let Some(err) = &self.create_error {
            return Err(anyhow!(err.clone()));
        }
        let mut created = self.created.lock().unwrap();
        created.push(event.clone());
        Ok(CalendarEvent {
            id: format!("evt-{}", created.len()),
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
            attendees: event.attendees.clone(),
            html_link: None,
        })
    }
}

/// Creates a test application router backed by a canned text service
/// and an in memory calendar.
pub fn test_app(text_response: &str, calendar: FakeCalendar) -> Router {
    let agent = MeetingAgent::new(
        IntentParser::new(Box::new(CannedText(text_response.to_string()))),
        Box::new(calendar),
        3,
    );
    app(Arc::new(AppState::new(agent)))
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
