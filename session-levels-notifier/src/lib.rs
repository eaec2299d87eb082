//! # Session Levels Notifier
//! Scheduled job around the `session-levels` calculator.
//!
//! For every configured ticker a run fetches 1-minute bars from a kline REST API, selects the
//! session window, computes the percentile bands and delivers them to a webhook together with a
//! summary of today's high impact economic calendar events. Each collaborator sits behind a
//! trait so a run can be driven entirely by in-memory fakes:
//! - [`BarSource`](source::BarSource)
//! - [`CalendarSource`](intel::CalendarSource)
//! - [`ChartRenderer`](render::ChartRenderer)
//! - [`Notifier`](notify::Notifier)
//!
//! Configuration is read once from the environment, see [`NotifierConfig`](config::NotifierConfig).

/// Environment driven [`NotifierConfig`](config::NotifierConfig).
pub mod config;

/// All [`Error`](std::error::Error)s generated in `session-levels-notifier`.
pub mod error;

/// Economic calendar sources and intel classification.
pub mod intel;

/// [`LevelsJob`](job::LevelsJob) runner.
pub mod job;

/// Notification formatting and delivery.
pub mod notify;

/// Optional attachments rendered from a window and its levels.
pub mod render;

/// Kline bar sources.
pub mod source;

pub use config::NotifierConfig;
pub use error::NotifierError;
pub use job::{LevelsJob, TickerOutcome};
