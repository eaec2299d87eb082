//! Fetch, compute and deliver for every configured ticker.

use crate::{
    config::NotifierConfig,
    error::NotifierError,
    intel::{CalendarSource, FinnhubCalendar, NoCalendar, fetch_intel},
    notify::{Delivery, LogNotifier, Notification, Notifier, WebhookNotifier},
    render::{ChartRenderer, CsvRenderer, NoChart},
    source::{BarSource, KlineSource},
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use session_levels::{EconomicIntel, compute_levels, select_window};
use tracing::{debug, error, info, warn};

/// Outcome of one run for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Delivered {
        ticker: String,
        delivery: Delivery,
    },
    /// No bars were available, nothing was computed or sent.
    Skipped { ticker: String },
    Failed { ticker: String, reason: String },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Delivered { ticker, .. }
            | TickerOutcome::Skipped { ticker }
            | TickerOutcome::Failed { ticker, .. } => ticker,
        }
    }
}

/// Session levels job wired to its collaborators.
pub struct LevelsJob {
    config: NotifierConfig,
    source: Box<dyn BarSource>,
    calendar: Box<dyn CalendarSource>,
    renderer: Box<dyn ChartRenderer>,
    notifier: Box<dyn Notifier>,
}

impl LevelsJob {
    pub fn new(
        config: NotifierConfig,
        source: Box<dyn BarSource>,
        calendar: Box<dyn CalendarSource>,
        renderer: Box<dyn ChartRenderer>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            source,
            calendar,
            renderer,
            notifier,
        }
    }

    /// Wire the HTTP collaborators described by `config`, sharing one client.
    pub fn from_config(config: NotifierConfig) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder().build()?;

        let source = Box::new(KlineSource::new(
            client.clone(),
            config.kline_url.clone(),
            config.kline_limit,
            config.http_timeout,
        ));

        let calendar: Box<dyn CalendarSource> = match &config.finnhub_api_key {
            Some(api_key) => Box::new(FinnhubCalendar::new(
                client.clone(),
                config.finnhub_url.clone(),
                api_key.clone(),
                config.http_timeout,
            )),
            None => {
                info!("FINNHUB_API_KEY not set, economic intel disabled");
                Box::new(NoCalendar)
            }
        };

        let renderer: Box<dyn ChartRenderer> = if config.attach_csv {
            Box::new(CsvRenderer)
        } else {
            Box::new(NoChart)
        };

        let notifier: Box<dyn Notifier> = match &config.webhook_url {
            Some(url) => Box::new(WebhookNotifier::new(
                client,
                url.clone(),
                config.http_timeout,
            )),
            None => {
                info!("WEBHOOK_URL not set, notifications will be logged only");
                Box::new(LogNotifier)
            }
        };

        Ok(Self::new(config, source, calendar, renderer, notifier))
    }

    /// Run once, or forever at the configured interval.
    pub async fn run(&self) {
        let Some(period) = self.config.run_interval else {
            self.run_once(Utc::now()).await;
            return;
        };

        info!(interval_secs = period.as_secs(), "running on interval");
        let mut timer = tokio::time::interval(period);
        loop {
            timer.tick().await;
            self.run_once(Utc::now()).await;
        }
    }

    /// Fetch intel once, then process every ticker concurrently.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Vec<TickerOutcome> {
        let intel = fetch_intel(self.calendar.as_ref(), now, self.config.intel_timezone).await;

        let outcomes = join_all(
            self.config
                .tickers
                .iter()
                .map(|ticker| self.process_ticker(ticker, &intel)),
        )
        .await;

        let delivered = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TickerOutcome::Delivered { .. }))
            .count();
        let skipped = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TickerOutcome::Skipped { .. }))
            .count();
        info!(
            delivered,
            skipped,
            failed = outcomes.len() - delivered - skipped,
            "run complete"
        );

        outcomes
    }

    async fn process_ticker(&self, ticker: &str, intel: &EconomicIntel) -> TickerOutcome {
        match self.deliver(ticker, intel).await {
            Ok(delivery) => {
                info!(ticker, ?delivery, "levels delivered");
                TickerOutcome::Delivered {
                    ticker: ticker.to_string(),
                    delivery,
                }
            }
            Err(error) if error.is_no_data() => {
                warn!(ticker, "no bars available, skipping");
                TickerOutcome::Skipped {
                    ticker: ticker.to_string(),
                }
            }
            Err(error) => {
                error!(ticker, %error, "failed to deliver levels");
                TickerOutcome::Failed {
                    ticker: ticker.to_string(),
                    reason: error.to_string(),
                }
            }
        }
    }

    async fn deliver(
        &self,
        ticker: &str,
        intel: &EconomicIntel,
    ) -> Result<Delivery, NotifierError> {
        let bars = self.source.fetch_bars(ticker).await?;

        let notification = {
            let window = select_window(&bars, &self.config.window)?;
            let levels = compute_levels(&window, &self.config.tiers);
            debug!(
                ticker,
                bars = bars.len(),
                window = window.len(),
                anchor = levels.anchor(),
                "computed levels"
            );

            let attachment = self.renderer.render(ticker, &window, &levels)?;
            Notification::new(ticker, &levels, intel, attachment)
        };

        self.notifier.notify(&notification).await
    }
}
