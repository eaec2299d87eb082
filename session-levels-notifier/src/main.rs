use session_levels_notifier::{LevelsJob, NotifierConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    let config = match NotifierConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        tickers = ?config.tickers,
        window = ?config.window,
        tiers = ?config.tiers,
        kline_url = %config.kline_url,
        intel = config.finnhub_api_key.is_some(),
        webhook = config.webhook_url.is_some(),
        attach_csv = config.attach_csv,
        run_interval = ?config.run_interval,
        "Starting session levels notifier"
    );

    let job = match LevelsJob::from_config(config) {
        Ok(job) => job,
        Err(error) => {
            error!(%error, "failed to build job");
            std::process::exit(1);
        }
    };

    tokio::select! {
        _ = job.run() => {
            info!("Run finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
}

/// Initialise logging, `LOG_FORMAT=json` switches to structured JSON output.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
