//! Google Calendar API client for free/busy queries and creating events

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Error, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use super::oauth::refresh_access_token;
use crate::scheduler::{Attendee, BusyInterval, CalendarEvent, CalendarProvider, NewEvent};

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

/// How requests to the Calendar API are authorized.
#[derive(Clone, Debug)]
pub enum GoogleAuth {
    /// Used as is. It will stop working once it expires.
    AccessToken(String),
    /// Exchanged for a fresh access token before each call.
    RefreshToken {
        oauth_base_url: String,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

#[derive(Debug, Serialize)]
struct FreeBusyRequest<'a> {
    #[serde(rename = "timeMin")]
    time_min: String,
    #[serde(rename = "timeMax")]
    time_max: String,
    items: Vec<FreeBusyItem<'a>>,
}

#[derive(Debug, Serialize)]
struct FreeBusyItem<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<TimePeriod>,
    #[serde(default)]
    errors: Vec<FreeBusyError>,
}

#[derive(Debug, Deserialize)]
struct TimePeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyError {
    domain: Option<String>,
    reason: String,
}

/// DateTime structure from Google Calendar API
#[derive(Debug, Serialize, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl EventDateTime {
    fn utc(dt: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(dt.to_rfc3339()),
            time_zone: Some(String::from("UTC")),
        }
    }

    fn parse(&self) -> Result<DateTime<Utc>> {
        let raw = self
            .date_time
            .as_deref()
            .ok_or(anyhow!("Event is missing a dateTime"))?;
        Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid event dateTime {}", raw))?
            .with_timezone(&Utc))
    }
}

#[derive(Debug, Serialize)]
struct InsertEventRequest<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventDateTime,
    end: EventDateTime,
    #[serde(skip_serializing_if = "<[Attendee]>::is_empty")]
    attendees: &'a [Attendee],
}

/// Calendar event as returned by Google API (intermediate structure)
#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    start: EventDateTime,
    end: EventDateTime,
    attendees: Option<Vec<Attendee>>,
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}

impl TryFrom<GoogleEvent> for CalendarEvent {
    type Error = Error;

    fn try_from(event: GoogleEvent) -> Result<Self> {
        Ok(CalendarEvent {
            start: event.start.parse()?,
            end: event.end.parse()?,
            id: event.id,
            summary: event.summary.unwrap_or_default(),
            description: event.description.unwrap_or_default(),
            attendees: event.attendees.unwrap_or_default(),
            html_link: event.html_link,
        })
    }
}

/// Fails with the status and body of any non 2xx response so the
/// provider's own explanation reaches the user.
async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    bail!("Google Calendar returned {}: {}", status, body.trim())
}

pub struct GoogleCalendar {
    client: Client,
    api_base_url: String,
    calendar_id: String,
    auth: GoogleAuth,
}

impl GoogleCalendar {
    pub fn new(api_base_url: &str, calendar_id: &str, auth: GoogleAuth) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            auth,
        })
    }

    async fn access_token(&self) -> Result<String> {
        match &self.auth {
            GoogleAuth::AccessToken(token) => Ok(token.clone()),
            GoogleAuth::RefreshToken {
                oauth_base_url,
                client_id,
                client_secret,
                refresh_token,
            } => {
                let token = refresh_access_token(
                    &self.client,
                    oauth_base_url,
                    client_id,
                    client_secret,
                    refresh_token,
                )
                .await
                .context("Failed to refresh Google access token")?;
                Ok(token.access_token)
            }
        }
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn busy_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Error> {
        let access_token = self.access_token().await?;
        let url = format!("{}/calendar/v3/freeBusy", self.api_base_url);
        let body = FreeBusyRequest {
            time_min: start.to_rfc3339(),
            time_max: end.to_rfc3339(),
            items: vec![FreeBusyItem {
                id: &self.calendar_id,
            }],
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;
        let mut resp: FreeBusyResponse = ensure_success(resp).await?.json().await?;

        let calendar = resp
            .calendars
            .remove(&self.calendar_id)
            .ok_or(anyhow!("No free/busy data for calendar {}", self.calendar_id))?;

        if let Some(err) = calendar.errors.first() {
            bail!(
                "Free/busy query for calendar {} failed: {} ({})",
                self.calendar_id,
                err.reason,
                err.domain.as_deref().unwrap_or("unknown")
            );
        }

        Ok(calendar
            .busy
            .into_iter()
            .map(|p| BusyInterval::new(p.start, p.end))
            .collect())
    }

    async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, Error> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/calendar/v3/calendars/{}/events",
            self.api_base_url,
            urlencoding::encode(&self.calendar_id)
        );
        let body = InsertEventRequest {
            summary: &event.summary,
            description: &event.description,
            start: EventDateTime::utc(event.start),
            end: EventDateTime::utc(event.end),
            attendees: &event.attendees,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;
        let created: GoogleEvent = ensure_success(resp).await?.json().await?;

        created.try_into()
    }
}
