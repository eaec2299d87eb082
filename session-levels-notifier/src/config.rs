//! Job configuration.
//!
//! Read once at startup from the environment and passed explicitly to every collaborator. The
//! level calculator itself never consults it.

use crate::error::NotifierError;
use chrono_tz::Tz;
use session_levels::{
    DEFAULT_FALLBACK_LOOKBACK, DEFAULT_LOOKBACK, PercentileTier, WindowPolicy, parse_session_start,
};
use std::{str::FromStr, time::Duration};
use url::Url;

const DEFAULT_TICKERS: &str = "BTCUSDT";
const DEFAULT_SESSION_START: &str = "08:30";
const DEFAULT_TIMEZONE: &str = "America/Chicago";
const DEFAULT_INTEL_TIMEZONE: &str = "US/Eastern";
const DEFAULT_KLINE_URL: &str = "https://fapi.binance.com";
const DEFAULT_KLINE_LIMIT: u32 = 1000;
const DEFAULT_FINNHUB_URL: &str = "https://finnhub.io";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Session levels job configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Instruments to compute levels for, processed concurrently.
    pub tickers: Vec<String>,
    pub window: WindowPolicy,
    pub tiers: Vec<PercentileTier>,
    /// Kline REST base URL.
    pub kline_url: Url,
    /// Klines requested per ticker.
    pub kline_limit: u32,
    /// Economic calendar API key, intel degrades to "No News" when absent.
    pub finnhub_api_key: Option<String>,
    pub finnhub_url: Url,
    /// Timezone whose calendar day defines "today" for economic intel.
    pub intel_timezone: Tz,
    /// Webhook to deliver to, notifications are only logged when absent.
    pub webhook_url: Option<Url>,
    /// Attach the window and its levels as CSV.
    pub attach_csv: bool,
    pub http_timeout: Duration,
    /// Run repeatedly at this interval, or once when absent.
    pub run_interval: Option<Duration>,
}

impl NotifierConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, NotifierError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns the raw value of a variable if set.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifierError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let tickers = var("LEVELS_TICKERS")
            .unwrap_or_else(|| DEFAULT_TICKERS.to_string())
            .split(',')
            .map(|ticker| ticker.trim().to_uppercase())
            .filter(|ticker| !ticker.is_empty())
            .collect::<Vec<_>>();
        if tickers.is_empty() {
            return Err(NotifierError::config("LEVELS_TICKERS", "no tickers configured"));
        }

        let lookback = parse_or(var("LEVELS_LOOKBACK"), "LEVELS_LOOKBACK", DEFAULT_LOOKBACK)?;
        let window = match var("LEVELS_WINDOW").as_deref().unwrap_or("session") {
            "lookback" => WindowPolicy::lookback(lookback),
            "session" => {
                let start = var("LEVELS_SESSION_START")
                    .unwrap_or_else(|| DEFAULT_SESSION_START.to_string());
                let start = parse_session_start(&start).map_err(|error| {
                    NotifierError::config("LEVELS_SESSION_START", error.to_string())
                })?;
                let timezone =
                    parse_timezone(var("LEVELS_TIMEZONE"), "LEVELS_TIMEZONE", DEFAULT_TIMEZONE)?;
                let fallback = parse_or(
                    var("LEVELS_FALLBACK_LOOKBACK"),
                    "LEVELS_FALLBACK_LOOKBACK",
                    DEFAULT_FALLBACK_LOOKBACK,
                )?;
                WindowPolicy::session_start(start, timezone).with_fallback_lookback(fallback)
            }
            other => {
                return Err(NotifierError::config(
                    "LEVELS_WINDOW",
                    format!("expected 'session' or 'lookback', got '{other}'"),
                ));
            }
        };

        let tiers = match var("LEVELS_TIERS") {
            Some(tiers) => tiers
                .split(',')
                .map(|tier| {
                    let tier = tier.trim().parse::<f64>().map_err(|error| {
                        NotifierError::config("LEVELS_TIERS", format!("{tier}: {error}"))
                    })?;
                    PercentileTier::new(tier)
                        .map_err(|error| NotifierError::config("LEVELS_TIERS", error.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => PercentileTier::DEFAULT.to_vec(),
        };

        let run_interval = var("RUN_INTERVAL_SECS")
            .map(|secs| parse_or(Some(secs), "RUN_INTERVAL_SECS", 0u64))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            tickers,
            window,
            tiers,
            kline_url: parse_url(var("LEVELS_KLINE_URL"), "LEVELS_KLINE_URL", DEFAULT_KLINE_URL)?,
            kline_limit: parse_or(
                var("LEVELS_KLINE_LIMIT"),
                "LEVELS_KLINE_LIMIT",
                DEFAULT_KLINE_LIMIT,
            )?,
            finnhub_api_key: var("FINNHUB_API_KEY"),
            finnhub_url: parse_url(var("FINNHUB_URL"), "FINNHUB_URL", DEFAULT_FINNHUB_URL)?,
            intel_timezone: parse_timezone(
                var("INTEL_TIMEZONE"),
                "INTEL_TIMEZONE",
                DEFAULT_INTEL_TIMEZONE,
            )?,
            webhook_url: var("WEBHOOK_URL")
                .map(|url| parse_url(Some(url), "WEBHOOK_URL", ""))
                .transpose()?,
            attach_csv: parse_or(var("LEVELS_ATTACH_CSV"), "LEVELS_ATTACH_CSV", false)?,
            http_timeout: Duration::from_secs(parse_or(
                var("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            run_interval,
        })
    }

    /// Set the tickers to process.
    pub fn with_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tickers = tickers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the window selection policy.
    pub fn with_window(mut self, window: WindowPolicy) -> Self {
        self.window = window;
        self
    }

    /// Set the webhook URL.
    pub fn with_webhook_url(mut self, url: Url) -> Self {
        self.webhook_url = Some(url);
        self
    }

    /// Set the run interval.
    pub fn with_run_interval(mut self, interval: Duration) -> Self {
        self.run_interval = Some(interval);
        self
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, NotifierError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .parse()
            .map_err(|error: T::Err| NotifierError::config(key, format!("{value}: {error}"))),
        None => Ok(default),
    }
}

fn parse_url(value: Option<String>, key: &str, default: &str) -> Result<Url, NotifierError> {
    let value = value.unwrap_or_else(|| default.to_string());
    Url::parse(&value).map_err(|error| NotifierError::config(key, format!("{value}: {error}")))
}

fn parse_timezone(value: Option<String>, key: &str, default: &str) -> Result<Tz, NotifierError> {
    let value = value.unwrap_or_else(|| default.to_string());
    value
        .parse::<Tz>()
        .map_err(|error| NotifierError::config(key, format!("{value}: {error}")))
}
