//! Economic calendar intel.
//!
//! Summarises high impact US events into a one line status: today's releases with a countdown,
//! or the day of the next upcoming release.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Impact rating of a high impact event.
pub const HIGH_IMPACT: u8 = 3;

/// Country code of events considered for intel.
pub const INTEL_COUNTRY: &str = "US";

/// Economic calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EconomicEvent {
    pub event: String,
    pub country: String,
    pub impact: u8,
    pub time: DateTime<Utc>,
}

impl EconomicEvent {
    fn is_high_impact_us(&self) -> bool {
        self.impact == HIGH_IMPACT && self.country == INTEL_COUNTRY
    }
}

/// Red when a high impact release is scheduled today, otherwise green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum IntelStatus {
    Red,
    Green,
}

impl IntelStatus {
    /// RGB colour used by notification collaborators.
    pub fn colour(&self) -> u32 {
        match self {
            IntelStatus::Red => 0xe74c3c,
            IntelStatus::Green => 0x2ecc71,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EconomicIntel {
    pub text: String,
    pub status: IntelStatus,
}

impl EconomicIntel {
    pub fn no_news() -> Self {
        Self {
            text: "No News".to_string(),
            status: IntelStatus::Green,
        }
    }
}

impl Default for EconomicIntel {
    fn default() -> Self {
        Self::no_news()
    }
}

/// Classify `events` relative to `now`.
///
/// Today is the calendar day of `now` in `timezone`. An event is today's when its UTC calendar
/// day matches it, which is how the calendar feed dates its entries. Days until the next event are
/// counted in `timezone`.
pub fn classify_events(
    events: &[EconomicEvent],
    now: DateTime<Utc>,
    timezone: Tz,
) -> EconomicIntel {
    let today = now.with_timezone(&timezone).date_naive();

    let mut today_lines = Vec::new();
    let mut next_event: Option<DateTime<Utc>> = None;

    for event in events.iter().filter(|event| event.is_high_impact_us()) {
        if event.time.date_naive() == today {
            let minutes_left = (event.time - now).num_milliseconds().div_euclid(60_000);

            let timer = if minutes_left > 0 {
                format!(" (In {minutes_left}m)")
            } else if minutes_left > -60 {
                " (JUST RELEASED)".to_string()
            } else {
                String::new()
            };

            today_lines.push(format!("🚩 **{}**{timer}", event.event));
        } else if event.time > now {
            next_event = Some(next_event.map_or(event.time, |next| next.min(event.time)));
        }
    }

    if !today_lines.is_empty() {
        return EconomicIntel {
            text: today_lines.join("\n"),
            status: IntelStatus::Red,
        };
    }

    match next_event {
        Some(next) => {
            let next_local = next.with_timezone(&timezone);
            let days_away = (next_local.date_naive() - today).num_days();
            let day = if days_away == 1 {
                "Tomorrow".to_string()
            } else {
                next_local.format("%A").to_string()
            };

            EconomicIntel {
                text: format!("No News Today. Next Major Intel: **{day}**"),
                status: IntelStatus::Green,
            }
        }
        None => EconomicIntel::no_news(),
    }
}
