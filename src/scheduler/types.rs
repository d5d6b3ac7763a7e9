//! Domain types shared by the intent parser, slot finder and booking
//! engine.

use std::fmt;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// A half open `[start, end)` range of time. Construction rejects
/// empty or inverted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            bail!("Window end {} must be after start {}", end, start);
        }
        Ok(Self { start, end })
    }
}

#[derive(Deserialize)]
struct RawTimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = anyhow::Error;

    fn try_from(raw: RawTimeWindow) -> Result<Self> {
        TimeWindow::new(raw.start, raw.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingMode {
    #[default]
    Online,
    InPerson,
    Other,
}

impl MeetingMode {
    /// Loose mapping from whatever the text service hands back.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "online" | "zoom" | "video" | "remote" | "virtual" => MeetingMode::Online,
            "in-person" | "in person" | "inperson" | "onsite" | "on-site" => {
                MeetingMode::InPerson
            }
            _ => MeetingMode::Other,
        }
    }
}

impl fmt::Display for MeetingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            MeetingMode::Online => "online",
            MeetingMode::InPerson => "in-person",
            MeetingMode::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// Structured intent produced by the intent parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub title: Option<String>,
    pub duration_minutes: u32,
    pub attendees: Vec<String>,
    pub window: TimeWindow,
    pub mode: MeetingMode,
}

/// A period already occupied on the target calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when `[start, end)` intersects this interval.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !(end <= self.start || start >= self.end)
    }
}

/// A start time at which a meeting of the requested duration fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub start: DateTime<Utc>,
}

impl fmt::Display for SlotCandidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.start.to_rfc3339())
    }
}

/// Attendee as understood by the calendar provider. Strings with an
/// `@` are addressed by email, anything else is a display name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attendee {
    Email {
        email: String,
    },
    Named {
        #[serde(rename = "displayName")]
        display_name: String,
    },
}

impl From<&str> for Attendee {
    fn from(value: &str) -> Self {
        if value.contains('@') {
            Attendee::Email {
                email: value.to_string(),
            }
        } else {
            Attendee::Named {
                display_name: value.to_string(),
            }
        }
    }
}

/// Payload of a create event call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
}

/// An event as recorded by the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
    pub html_link: Option<String>,
}
