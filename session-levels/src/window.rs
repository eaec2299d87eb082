//! Session window selection.
//!
//! Chooses the contiguous run of [`Bar`]s that represents "the session" to analyse, either by a
//! fixed lookback count or by a wall-clock session start in a reference timezone.

use crate::{bar::Bar, error::LevelError};
use chrono::{NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Default number of bars used by [`WindowPolicy::Lookback`].
pub const DEFAULT_LOOKBACK: usize = 500;

/// Default number of bars used when a session has not started yet for the current data.
pub const DEFAULT_FALLBACK_LOOKBACK: usize = 100;

/// Policy used by [`select_window`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowPolicy {
    /// Last `bars` bars of the series, or all of them if fewer are available.
    Lookback { bars: usize },

    /// Every bar at or after `start` (wall-clock, in `timezone`) on the calendar day of the most
    /// recent bar. Falls back to the last `fallback_lookback` bars when that selects nothing.
    SessionStart {
        start: NaiveTime,
        timezone: Tz,
        fallback_lookback: usize,
    },
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::Lookback {
            bars: DEFAULT_LOOKBACK,
        }
    }
}

impl WindowPolicy {
    pub fn lookback(bars: usize) -> Self {
        Self::Lookback { bars }
    }

    /// Session start policy with the [`DEFAULT_FALLBACK_LOOKBACK`].
    pub fn session_start(start: NaiveTime, timezone: Tz) -> Self {
        Self::SessionStart {
            start,
            timezone,
            fallback_lookback: DEFAULT_FALLBACK_LOOKBACK,
        }
    }

    /// Set the fallback lookback of a [`WindowPolicy::SessionStart`]. No-op for lookback policies.
    pub fn with_fallback_lookback(mut self, bars: usize) -> Self {
        if let Self::SessionStart {
            fallback_lookback, ..
        } = &mut self
        {
            *fallback_lookback = bars;
        }
        self
    }
}

/// Parse a wall-clock session start such as `08:30` or `08:30:00`.
pub fn parse_session_start(input: &str) -> Result<NaiveTime, LevelError> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|error| LevelError::InvalidSessionStart(format!("{input}: {error}")))
}

/// Non-empty, chronologically ordered run of [`Bar`]s borrowed from the fetched series.
///
/// The anchor is always the first bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionWindow<'a> {
    bars: &'a [Bar],
}

impl<'a> SessionWindow<'a> {
    pub fn new(bars: &'a [Bar]) -> Result<Self, LevelError> {
        if bars.is_empty() {
            Err(LevelError::NoData)
        } else {
            Ok(Self { bars })
        }
    }

    pub fn bars(&self) -> &'a [Bar] {
        self.bars
    }

    pub fn anchor_bar(&self) -> &'a Bar {
        &self.bars[0]
    }

    /// Open price of the first bar in the window.
    pub fn anchor(&self) -> f64 {
        self.anchor_bar().open
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false, a [`SessionWindow`] cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Select the [`SessionWindow`] for `bars` according to `policy`.
///
/// `bars` must be in ascending time order. Returns [`LevelError::NoData`] when the input is empty
/// or the policy resolves to zero bars.
pub fn select_window<'a>(
    bars: &'a [Bar],
    policy: &WindowPolicy,
) -> Result<SessionWindow<'a>, LevelError> {
    let Some(last) = bars.last() else {
        return Err(LevelError::NoData);
    };

    match *policy {
        WindowPolicy::Lookback { bars: lookback } => {
            let window = last_n(bars, lookback);
            debug!(lookback, len = window.len(), "selected lookback window");
            SessionWindow::new(window)
        }
        WindowPolicy::SessionStart {
            start,
            timezone,
            fallback_lookback,
        } => {
            let session_day = last.time.with_timezone(&timezone).date_naive();

            let Some(session_start) = session_day
                .and_time(start)
                .and_local_timezone(timezone)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
            else {
                debug!(
                    %session_day,
                    %start,
                    %timezone,
                    "session start does not exist in timezone, using fallback lookback"
                );
                return SessionWindow::new(last_n(bars, fallback_lookback));
            };

            let first_in_session = bars.partition_point(|bar| bar.time < session_start);
            let window = &bars[first_in_session..];

            if window.is_empty() {
                debug!(
                    %session_start,
                    fallback_lookback,
                    "session has not started for current data, using fallback lookback"
                );
                return SessionWindow::new(last_n(bars, fallback_lookback));
            }

            debug!(%session_start, len = window.len(), "selected session window");
            SessionWindow::new(window)
        }
    }
}

fn last_n(bars: &[Bar], n: usize) -> &[Bar] {
    &bars[bars.len().saturating_sub(n)..]
}
