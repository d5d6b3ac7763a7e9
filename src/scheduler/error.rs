use thiserror::Error;

/// Failures that must reach the user. Parse problems never show up
/// here since the intent parser always degrades to defaults, and an
/// empty slot list is a normal outcome rather than an error.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Calendar check failed: {0:#}")]
    CalendarQuery(anyhow::Error),

    #[error("Booking failed: {0:#}")]
    Booking(anyhow::Error),

    /// The request can't describe a real event, e.g. it has no length
    /// or ends past the last representable instant.
    #[error("Invalid meeting request: {0}")]
    InvalidRequest(String),
}
