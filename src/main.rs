/// main.rs — Position Monitor Entry Point
///
/// FLOW:
///   1. Load config from .env (BINANCE_API_KEY, BINANCE_API_SECRET, etc.)
///   2. Sync with Binance server time so signed requests are accepted
///   3. Poll /fapi/v2/positionRisk at interval cadence
///   4. Feed each snapshot to the tracker; log every lifecycle event
///      with the position's stable fingerprint
use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use position_engine::config::AppConfig;
use position_engine::exchange::PositionRiskClient;
use position_engine::time_sync::TimeSync;
use position_engine::PositionTracker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::from_env()?;
    if !cfg.use_testnet {
        warn!("mainnet credentials active — monitoring live account positions");
    }
    info!(
        rest_url = %cfg.rest_url,
        poll_secs = cfg.poll_secs,
        pairs = ?cfg.trading_pairs,
        "position monitor starting"
    );

    let client = PositionRiskClient::new(&cfg.api_key, &cfg.api_secret, &cfg.rest_url)?;
    let mut time_sync = TimeSync::new();
    time_sync.sync(&cfg.rest_url).await?;

    let mut tracker = PositionTracker::new();

    // First fetch happens immediately so startup reflects account state;
    // the sleep sits at the end of the loop.
    loop {
        let mut cycle: Vec<_> = Vec::new();
        if cfg.trading_pairs.is_empty() {
            match client
                .fetch_positions(None, time_sync.timestamp_ms(), cfg.dust_threshold)
                .await
            {
                Ok(positions) => cycle = positions,
                Err(e) => error!("failed to fetch positions: {e:#}"),
            }
        } else {
            for pair in &cfg.trading_pairs {
                match client
                    .fetch_positions(Some(pair), time_sync.timestamp_ms(), cfg.dust_threshold)
                    .await
                {
                    Ok(positions) => cycle.extend(positions),
                    Err(e) => error!("failed to fetch {pair}: {e:#}"),
                }
            }
        }

        for position in &cycle {
            match tracker.apply(&position.ticker, &position.snapshot, position.amount) {
                Ok(Some(event)) => {
                    info!(ticker = %position.ticker, ?event, "lifecycle transition")
                }
                Ok(None) => {}
                Err(e) => {
                    // Never fall back to a default fingerprint: skip the
                    // snapshot and let the next poll retry.
                    error!(ticker = %position.ticker, "identity hashing failed: {e}");
                }
            }
        }

        info!(open_positions = tracker.len(), "poll cycle complete");
        sleep(Duration::from_secs(cfg.poll_secs)).await;
    }
}
