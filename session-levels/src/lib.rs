//! # Session Levels
//! Percentile price bands anchored to a session open, computed from intraday OHLC bars.
//!
//! The library is pure and synchronous:
//! - [`select_window`] picks the bars that make up the session, by lookback count or by a
//!   wall-clock session start in a reference timezone.
//! - [`compute_levels`] turns that window into P50/P75/P90 high and low bands using a
//!   nearest-rank percentile of the signed excursions from the anchor open.
//! - [`classify_events`] summarises high impact economic calendar events into a status line.
//!
//! Fetching bars, rendering charts and delivering notifications belong to callers, see the
//! `session-levels-notifier` crate.
//!
//! ```
//! use chrono::{DateTime, Duration};
//! use session_levels::{Bar, WindowPolicy, compute_default_levels, select_window};
//!
//! let start = DateTime::from_timestamp(1_709_562_600, 0).unwrap();
//! let bars = [(100.0, 105.0, 98.0), (102.0, 108.0, 101.0), (101.0, 103.0, 99.0)]
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, (open, high, low))| {
//!         Bar::new(start + Duration::minutes(i as i64), open, high, low, open, 0.0)
//!     })
//!     .collect::<Vec<_>>();
//!
//! let window = select_window(&bars, &WindowPolicy::default()).unwrap();
//! let levels = compute_default_levels(&window);
//!
//! assert_eq!(levels.anchor(), 100.0);
//! assert_eq!(levels.get_named("P50 H"), Some(105.0));
//! assert_eq!(levels.get_named("P50 L"), Some(99.0));
//! ```

/// OHLCV [`Bar`] sample.
pub mod bar;

/// Economic calendar intel classification.
pub mod calendar;

/// All [`Error`](std::error::Error)s generated in `session-levels`.
pub mod error;

/// Percentile band [`LevelMap`] calculation.
pub mod levels;

/// Nearest-rank percentile estimator.
pub mod percentile;

/// Session [`WindowPolicy`] and [`select_window`].
pub mod window;

pub use bar::Bar;
pub use calendar::{EconomicEvent, EconomicIntel, IntelStatus, classify_events};
pub use error::LevelError;
pub use levels::{
    ANCHOR_LEVEL, BandSide, ExcursionSet, LevelMap, compute_default_levels, compute_levels,
    level_name,
};
pub use percentile::{PercentileTier, percentile_nearest_rank};
pub use window::{
    DEFAULT_FALLBACK_LOOKBACK, DEFAULT_LOOKBACK, SessionWindow, WindowPolicy, parse_session_start,
    select_window,
};
