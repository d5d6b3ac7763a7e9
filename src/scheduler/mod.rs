//! Slot finding and booking against a calendar provider.

mod agent;
mod booking;
mod error;
mod provider;
mod slots;
mod types;

pub use agent::{Availability, MeetingAgent, Suggestions};
pub use booking::{book, default_title};
pub use error::ScheduleError;
pub use provider::{BoxedCalendarProvider, CalendarProvider};
pub use slots::{DEFAULT_MAX_SUGGESTIONS, SLOT_BUFFER_MINUTES, find_slots};
pub use types::*;
