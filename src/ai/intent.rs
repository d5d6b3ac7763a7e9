//! Intent parser that turns a free text meeting request into a
//! [`MeetingRequest`].
//!
//! The text service is asked for a JSON object. Anything it returns
//! that can't be read as that object is handled by a rule based
//! fallback, so parsing never fails outright.

use std::sync::LazyLock;

use anyhow::{Error, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::ai::prompt::{Prompt, templates};
use crate::scheduler::{DEFAULT_DURATION_MINUTES, MeetingMode, MeetingRequest, TimeWindow};

/// Anything that can answer a prompt with free form text.
#[async_trait]
pub trait TextService {
    async fn complete(&self, prompt: &str) -> Result<String, Error>;
}

pub type BoxedTextService = Box<dyn TextService + Send + Sync + 'static>;

/// Outcome of reading the text service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedIntent {
    Structured(MeetingRequest),
    ParseFailure(String),
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*-?\s*(?:minutes|minute|mins|min)\b").expect("Invalid duration regex")
});

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const WORKDAY_START_HOUR: i64 = 9;
const WORKDAY_HOURS: i64 = 8;

#[derive(Debug, Deserialize)]
struct IntentPayload {
    title: Option<String>,
    duration: Option<Value>,
    attendees: Option<Vec<String>>,
    window: Option<WindowPayload>,
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindowPayload {
    start: Option<String>,
    end: Option<String>,
}

pub struct IntentParser {
    service: BoxedTextService,
}

impl IntentParser {
    pub fn new(service: BoxedTextService) -> Self {
        Self { service }
    }

    pub async fn parse(&self, text: &str) -> MeetingRequest {
        self.parse_at(text, Utc::now()).await
    }

    /// Parse relative to `now`, which anchors "tomorrow" and the
    /// default window.
    pub async fn parse_at(&self, text: &str, now: DateTime<Utc>) -> MeetingRequest {
        let prompt = match render_prompt(text, now) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("Failed to render intent prompt, using fallback: {:#}", e);
                return simple_parse(text, now);
            }
        };

        let raw = match self.service.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Text service failed, using fallback: {:#}", e);
                return simple_parse(text, now);
            }
        };
        tracing::debug!("Text service response: {}", raw);

        match parse_response(&raw, now) {
            ParsedIntent::Structured(request) => request,
            ParsedIntent::ParseFailure(reason) => {
                tracing::warn!("Unusable intent response ({}), using fallback", reason);
                simple_parse(text, now)
            }
        }
    }
}

fn render_prompt(text: &str, now: DateTime<Utc>) -> Result<String> {
    let prompt = templates().render(
        &Prompt::MeetingIntent.to_string(),
        &json!({
            "text": text,
            "today": now.date_naive().to_string(),
        }),
    )?;
    Ok(prompt)
}

/// 09:00 to 17:00 UTC on the day after `now`.
pub fn default_window(now: DateTime<Utc>) -> TimeWindow {
    let tomorrow = now.date_naive() + Duration::days(1);
    let start = tomorrow.and_time(NaiveTime::MIN).and_utc() + Duration::hours(WORKDAY_START_HOUR);
    TimeWindow {
        start,
        end: start + Duration::hours(WORKDAY_HOURS),
    }
}

/// Rule based fallback. Only the duration is read from the text,
/// everything else is a default.
pub fn simple_parse(text: &str, now: DateTime<Utc>) -> MeetingRequest {
    let duration_minutes = DURATION_RE
        .captures(&text.to_lowercase())
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|minutes| *minutes > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES);

    MeetingRequest {
        title: None,
        duration_minutes,
        attendees: vec![],
        window: default_window(now),
        mode: MeetingMode::Online,
    }
}

/// Read the text service output as a meeting request. The JSON object
/// may be wrapped in code fences or prose.
pub fn parse_response(raw: &str, now: DateTime<Utc>) -> ParsedIntent {
    let Some(body) = extract_json(raw) else {
        return ParsedIntent::ParseFailure(String::from("no JSON object in response"));
    };

    let payload: IntentPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) => return ParsedIntent::ParseFailure(format!("invalid intent JSON: {}", e)),
    };

    match request_from_payload(payload, now) {
        Ok(request) => ParsedIntent::Structured(request),
        Err(e) => ParsedIntent::ParseFailure(format!("{:#}", e)),
    }
}

fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn request_from_payload(payload: IntentPayload, now: DateTime<Utc>) -> Result<MeetingRequest> {
    let duration_minutes = parse_duration(payload.duration.as_ref())?;

    let window = match payload.window {
        None => default_window(now),
        Some(WindowPayload {
            start: None,
            end: None,
        }) => default_window(now),
        Some(WindowPayload {
            start: Some(start),
            end: Some(end),
        }) => TimeWindow::new(parse_timestamp(&start)?, parse_timestamp(&end)?)?,
        Some(_) => bail!("Window is missing a start or end"),
    };

    let title = payload
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let attendees = payload
        .attendees
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    let mode = payload
        .mode
        .as_deref()
        .map(MeetingMode::from_label)
        .unwrap_or_default();

    Ok(MeetingRequest {
        title,
        duration_minutes,
        attendees,
        window,
        mode,
    })
}

fn parse_duration(value: Option<&Value>) -> Result<u32> {
    let minutes = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_DURATION_MINUTES),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or(anyhow!("Duration is not a whole number: {}", n))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("Duration is not a number: {}", s))?,
        Some(other) => bail!("Unexpected duration: {}", other),
    };

    match minutes {
        0 => Ok(DEFAULT_DURATION_MINUTES),
        m if m < 0 => bail!("Negative duration: {}", m),
        m => u32::try_from(m).map_err(|_| anyhow!("Duration out of range: {}", m)),
    }
}

/// RFC 3339, or a naive ISO 8601 timestamp taken to be UTC.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or(anyhow!("Unrecognized timestamp: {}", value))
}
