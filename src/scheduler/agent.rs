use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::booking::book;
use super::error::ScheduleError;
use super::provider::BoxedCalendarProvider;
use super::slots::find_slots;
use super::types::{CalendarEvent, MeetingRequest, SlotCandidate};
use crate::ai::intent::IntentParser;

/// Result of a successful calendar check. Finding nothing is a normal
/// outcome and is kept apart from a failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Slots(Vec<SlotCandidate>),
    NoSlotsAvailable,
}

impl Availability {
    pub fn slots(&self) -> &[SlotCandidate] {
        match self {
            Availability::Slots(slots) => slots,
            Availability::NoSlotsAvailable => &[],
        }
    }

    fn message(&self) -> String {
        match self {
            Availability::Slots(slots) => format!(
                "I found {} available slot(s). Do you want me to book the first one?",
                slots.len()
            ),
            Availability::NoSlotsAvailable => String::from(
                "No free slots found in that window. Try widening the window or choosing another day.",
            ),
        }
    }
}

impl From<Vec<SlotCandidate>> for Availability {
    fn from(slots: Vec<SlotCandidate>) -> Self {
        if slots.is_empty() {
            Availability::NoSlotsAvailable
        } else {
            Availability::Slots(slots)
        }
    }
}

/// Serialized as the plain list of slots, empty when nothing is free.
impl Serialize for Availability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots().serialize(serializer)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestions {
    pub parsed: MeetingRequest,
    pub message: String,
    #[serde(rename = "suggestions")]
    pub availability: Availability,
}

impl Suggestions {
    fn new(parsed: MeetingRequest, availability: Availability) -> Self {
        Self {
            parsed,
            message: availability.message(),
            availability,
        }
    }

    pub fn slots(&self) -> &[SlotCandidate] {
        self.availability.slots()
    }
}

/// Runs one request from free text to suggestions, and books a chosen
/// slot.
///
/// Nothing is reserved between suggesting and booking. Someone else can
/// take a suggested slot in the meantime and the booking will not
/// notice.
pub struct MeetingAgent {
    parser: IntentParser,
    calendar: BoxedCalendarProvider,
    max_suggestions: usize,
}

impl MeetingAgent {
    pub fn new(
        parser: IntentParser,
        calendar: BoxedCalendarProvider,
        max_suggestions: usize,
    ) -> Self {
        Self {
            parser,
            calendar,
            max_suggestions,
        }
    }

    pub async fn handle_request(&self, text: &str) -> Result<Suggestions, ScheduleError> {
        let parsed = self.parser.parse(text).await;
        self.suggest(parsed).await
    }

    /// Check the calendar for an already parsed request.
    pub async fn suggest(&self, parsed: MeetingRequest) -> Result<Suggestions, ScheduleError> {
        let window = parsed.window;
        tracing::info!(
            "Checking calendar from {} to {} for a {} minute meeting",
            window.start,
            window.end,
            parsed.duration_minutes
        );

        let busy = self
            .calendar
            .busy_intervals(window.start, window.end)
            .await
            .map_err(ScheduleError::CalendarQuery)?;
        tracing::debug!("Found {} busy period(s)", busy.len());

        let availability = Availability::from(find_slots(
            &busy,
            window.start,
            window.end,
            parsed.duration_minutes,
            self.max_suggestions,
        ));

        Ok(Suggestions::new(parsed, availability))
    }

    pub async fn create_event_from_slot(
        &self,
        parsed: &MeetingRequest,
        start: DateTime<Utc>,
    ) -> Result<CalendarEvent, ScheduleError> {
        book(self.calendar.as_ref(), parsed, start).await
    }
}
