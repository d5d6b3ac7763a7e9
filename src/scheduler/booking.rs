//! Turns a confirmed slot into an event on the calendar.
//!
//! There is no idempotency key on the create call. A retry after a
//! timeout can leave a duplicate event behind, so nothing here retries.

use chrono::{DateTime, Duration, Utc};

use super::error::ScheduleError;
use super::provider::CalendarProvider;
use super::types::{Attendee, CalendarEvent, MeetingRequest, NewEvent};

/// Title used when the request doesn't carry one.
pub fn default_title(attendees: &[String]) -> String {
    if attendees.is_empty() {
        String::from("Meeting")
    } else {
        format!("Meeting with {}", attendees.join(", "))
    }
}

impl NewEvent {
    pub fn from_request(
        request: &MeetingRequest,
        start: DateTime<Utc>,
    ) -> Result<Self, ScheduleError> {
        if request.duration_minutes == 0 {
            return Err(ScheduleError::InvalidRequest(String::from(
                "duration must be at least one minute",
            )));
        }
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(request.duration_minutes)))
            .ok_or_else(|| {
                ScheduleError::InvalidRequest(format!(
                    "a {} minute meeting starting {} ends out of range",
                    request.duration_minutes, start
                ))
            })?;
        let summary = request
            .title
            .clone()
            .unwrap_or_else(|| default_title(&request.attendees));

        Ok(NewEvent {
            summary,
            description: format!("Mode: {}", request.mode),
            start,
            end,
            attendees: request
                .attendees
                .iter()
                .map(|a| Attendee::from(a.as_str()))
                .collect(),
        })
    }
}

/// Book `request` at `chosen_start`. The provider response is the only
/// record of success.
pub async fn book(
    calendar: &(dyn CalendarProvider + Send + Sync),
    request: &MeetingRequest,
    chosen_start: DateTime<Utc>,
) -> Result<CalendarEvent, ScheduleError> {
    let event = NewEvent::from_request(request, chosen_start)?;
    tracing::info!(
        "Booking \"{}\" from {} to {}",
        event.summary,
        event.start,
        event.end
    );

    let created = calendar
        .create_event(&event)
        .await
        .map_err(ScheduleError::Booking)?;

    tracing::info!("Created event {}", created.id);
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::types::{BusyInterval, MeetingMode, TimeWindow};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct RecordingCalendar {
        fail: bool,
        created: Mutex<Vec<NewEvent>>,
    }

    #[async_trait]
    impl CalendarProvider for RecordingCalendar {
        async fn busy_intervals(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<BusyInterval>> {
            Ok(vec![])
        }

        async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
            if self.fail {
                return Err(anyhow!("403 Forbidden"));
            }
            self.created.lock().unwrap().push(event.clone());
            Ok(CalendarEvent {
                id: String::from("evt-1"),
                summary: event.summary.clone(),
                description: event.description.clone(),
                start: event.start,
                end: event.end,
                attendees: event.attendees.clone(),
                html_link: None,
            })
        }
    }

    fn request(title: Option<&str>, attendees: &[&str]) -> MeetingRequest {
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        MeetingRequest {
            title: title.map(String::from),
            duration_minutes: 45,
            attendees: attendees.iter().map(|a| a.to_string()).collect(),
            window: TimeWindow::new(start, start + Duration::hours(8)).unwrap(),
            mode: MeetingMode::Online,
        }
    }

    #[test]
    fn it_derives_a_title_from_attendees() {
        let req = request(None, &["Rahul", "a@example.com"]);
        let start = req.window.start;
        let event = NewEvent::from_request(&req, start).unwrap();
        assert_eq!(event.summary, "Meeting with Rahul, a@example.com");
        assert_eq!(event.end, start + Duration::minutes(45));
        assert_eq!(event.description, "Mode: online");
    }

    #[test]
    fn it_keeps_an_explicit_title() {
        let req = request(Some("Quarterly review"), &["Bob"]);
        let event = NewEvent::from_request(&req, req.window.start).unwrap();
        assert_eq!(event.summary, "Quarterly review");
    }

    #[tokio::test]
    async fn it_rejects_an_end_past_the_last_instant() {
        let calendar = RecordingCalendar {
            fail: false,
            created: Mutex::new(vec![]),
        };
        let req = request(None, &["Bob"]);
        let start = DateTime::<Utc>::MAX_UTC - Duration::minutes(10);
        let err = book(&calendar, &req, start).await.unwrap_err();

        assert!(matches!(err, ScheduleError::InvalidRequest(_)));
        assert!(calendar.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_rejects_a_zero_length_meeting() {
        let calendar = RecordingCalendar {
            fail: false,
            created: Mutex::new(vec![]),
        };
        let mut req = request(None, &[]);
        req.duration_minutes = 0;
        let err = book(&calendar, &req, req.window.start).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid meeting request: duration must be at least one minute"
        );
        assert!(calendar.created.lock().unwrap().is_empty());
    }

    #[test]
    fn it_titles_a_meeting_without_attendees() {
        assert_eq!(default_title(&[]), "Meeting");
    }

    #[tokio::test]
    async fn it_books_email_and_display_name_attendees() {
        let calendar = RecordingCalendar {
            fail: false,
            created: Mutex::new(vec![]),
        };
        let req = request(None, &["a@example.com", "Bob"]);
        let event = book(&calendar, &req, req.window.start).await.unwrap();

        assert_eq!(event.id, "evt-1");
        assert_eq!(
            event.attendees,
            vec![
                Attendee::Email {
                    email: String::from("a@example.com")
                },
                Attendee::Named {
                    display_name: String::from("Bob")
                },
            ]
        );
        assert_eq!(calendar.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn it_surfaces_provider_failures_as_booking_errors() {
        let calendar = RecordingCalendar {
            fail: true,
            created: Mutex::new(vec![]),
        };
        let req = request(None, &[]);
        let err = book(&calendar, &req, req.window.start).await.unwrap_err();

        assert!(matches!(err, ScheduleError::Booking(_)));
        assert_eq!(err.to_string(), "Booking failed: 403 Forbidden");
    }
}
