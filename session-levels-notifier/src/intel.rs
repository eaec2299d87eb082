//! Economic calendar sources.

use crate::error::NotifierError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use session_levels::{EconomicEvent, EconomicIntel, classify_events};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fetches upcoming economic calendar events.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<EconomicEvent>, NotifierError>;
}

/// Calendar used when no API key is configured, always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCalendar;

#[async_trait]
impl CalendarSource for NoCalendar {
    async fn fetch_events(&self) -> Result<Vec<EconomicEvent>, NotifierError> {
        Ok(Vec::new())
    }
}

/// Finnhub economic calendar response
#[derive(Debug, Deserialize)]
struct FinnhubCalendarResponse {
    #[serde(rename = "economicCalendar", default)]
    economic_calendar: Vec<FinnhubEvent>,
}

#[derive(Debug, Deserialize)]
struct FinnhubEvent {
    #[serde(default)]
    event: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    impact: serde_json::Value,
    /// "YYYY-MM-DD HH:MM:SS" in UTC
    #[serde(alias = "date", default)]
    time: String,
}

impl FinnhubEvent {
    fn impact(&self) -> Option<u8> {
        match &self.impact {
            serde_json::Value::Number(number) => number.as_u64().and_then(|n| u8::try_from(n).ok()),
            serde_json::Value::String(label) => match label.to_lowercase().as_str() {
                "high" => Some(3),
                "medium" => Some(2),
                "low" => Some(1),
                other => other.parse().ok(),
            },
            _ => None,
        }
    }

    fn into_event(self) -> Option<EconomicEvent> {
        let impact = self.impact()?;
        let time = NaiveDateTime::parse_from_str(&self.time, "%Y-%m-%d %H:%M:%S")
            .ok()?
            .and_utc();

        Some(EconomicEvent {
            event: self.event,
            country: self.country,
            impact,
            time,
        })
    }
}

/// Parse a Finnhub calendar payload, skipping events with malformed impact or time.
pub fn parse_finnhub_calendar(payload: &str) -> Result<Vec<EconomicEvent>, NotifierError> {
    let response: FinnhubCalendarResponse =
        serde_json::from_str(payload).map_err(|error| NotifierError::Parse(error.to_string()))?;

    let total = response.economic_calendar.len();
    let events = response
        .economic_calendar
        .into_iter()
        .filter_map(FinnhubEvent::into_event)
        .collect::<Vec<_>>();

    if events.len() < total {
        debug!(skipped = total - events.len(), "skipped malformed calendar events");
    }

    Ok(events)
}

/// Finnhub economic calendar.
#[derive(Debug, Clone)]
pub struct FinnhubCalendar {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl FinnhubCalendar {
    pub fn new(client: reqwest::Client, base_url: Url, api_key: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl CalendarSource for FinnhubCalendar {
    async fn fetch_events(&self) -> Result<Vec<EconomicEvent>, NotifierError> {
        let url = self
            .base_url
            .join("/api/v1/calendar/economic")
            .map_err(|error| NotifierError::Http(format!("invalid calendar url: {error}")))?;

        let payload = self
            .client
            .get(url)
            .query(&[("token", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_finnhub_calendar(&payload)
    }
}

/// Fetch and classify calendar events. Any failure degrades to [`EconomicIntel::no_news`].
pub async fn fetch_intel(
    calendar: &dyn CalendarSource,
    now: DateTime<Utc>,
    timezone: Tz,
) -> EconomicIntel {
    match calendar.fetch_events().await {
        Ok(events) => {
            let intel = classify_events(&events, now, timezone);
            debug!(events = events.len(), status = ?intel.status, "classified economic calendar");
            intel
        }
        Err(error) => {
            warn!(%error, "economic calendar unavailable, reporting no news");
            EconomicIntel::no_news()
        }
    }
}
