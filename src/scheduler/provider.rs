use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{BusyInterval, CalendarEvent, NewEvent};

/// A calendar that can report busy periods and accept new events. The
/// calendar identifier is part of the provider's own configuration.
#[async_trait]
pub trait CalendarProvider {
    /// Busy periods intersecting `[start, end)`.
    async fn busy_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Error>;

    async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, Error>;
}

pub type BoxedCalendarProvider = Box<dyn CalendarProvider + Send + Sync + 'static>;
