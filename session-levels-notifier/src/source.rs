//! Bar sources.

use crate::error::NotifierError;
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use session_levels::Bar;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fetches a chronologically ordered bar series for one instrument.
#[async_trait]
pub trait BarSource: Send + Sync {
    async fn fetch_bars(&self, ticker: &str) -> Result<Vec<Bar>, NotifierError>;
}

/// Binance kline response format
#[derive(Debug, Deserialize)]
pub struct BinanceKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    i64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

impl BinanceKline {
    /// Convert to a [`Bar`], `None` if any field is unparseable or non-finite.
    fn to_bar(&self) -> Option<Bar> {
        let bar = Bar::new(
            DateTime::from_timestamp_millis(self.0)?,
            self.1.parse().ok()?,
            self.2.parse().ok()?,
            self.3.parse().ok()?,
            self.4.parse().ok()?,
            self.5.parse().ok()?,
        );
        bar.is_finite().then_some(bar)
    }
}

/// Convert klines to bars, dropping malformed rows.
pub fn klines_to_bars(klines: &[BinanceKline]) -> Vec<Bar> {
    let bars = klines.iter().filter_map(BinanceKline::to_bar).collect::<Vec<_>>();

    let dropped = klines.len() - bars.len();
    if dropped > 0 {
        warn!(dropped, "dropped malformed klines");
    }

    bars
}

/// 1-minute klines from a Binance futures compatible REST API.
#[derive(Debug, Clone)]
pub struct KlineSource {
    client: reqwest::Client,
    base_url: Url,
    limit: u32,
    timeout: Duration,
}

impl KlineSource {
    pub fn new(client: reqwest::Client, base_url: Url, limit: u32, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            limit,
            timeout,
        }
    }

    fn endpoint(&self) -> Result<Url, NotifierError> {
        self.base_url
            .join("/fapi/v1/klines")
            .map_err(|error| NotifierError::Http(format!("invalid kline url: {error}")))
    }
}

#[async_trait]
impl BarSource for KlineSource {
    async fn fetch_bars(&self, ticker: &str) -> Result<Vec<Bar>, NotifierError> {
        let response = self
            .client
            .get(self.endpoint()?)
            .query(&[
                ("symbol", ticker.to_string()),
                ("interval", "1m".to_string()),
                ("limit", self.limit.to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let klines: Vec<BinanceKline> = response.json().await?;
        debug!(ticker, klines = klines.len(), "fetched klines");

        Ok(klines_to_bars(&klines))
    }
}
