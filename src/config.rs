/// config.rs — Centralised configuration loaded from .env
///
/// Loading happens once at startup; the monitor borrows &AppConfig.
use anyhow::Result;
use std::env;

/// Position sizes below this are exchange rounding residue, not exposure.
pub const DEFAULT_DUST_THRESHOLD: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // ── Binance credentials ───────────────────────────────────────────
    pub api_key: String,
    pub api_secret: String,
    pub use_testnet: bool,

    // ── REST endpoint ────────────────────────────────────────────────
    pub rest_url: String,

    // ── Monitoring ───────────────────────────────────────────────────
    /// Symbols to poll; empty means the whole account.
    pub trading_pairs: Vec<String>,
    /// Seconds between positionRisk polls.
    pub poll_secs: u64,
    /// |positionAmt| below this counts as zero exposure.
    pub dust_threshold: f64,
}

impl AppConfig {
    /// Load configuration from environment variables (after dotenv).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // ignore missing .env

        let api_key = env::var("BINANCE_API_KEY").unwrap_or_default();
        let api_secret = env::var("BINANCE_API_SECRET").unwrap_or_default();
        let use_testnet = env::var("BINANCE_USE_TESTNET")
            .unwrap_or_else(|_| "true".into())
            .to_lowercase()
            == "true";

        let rest_url = env::var("BINANCE_FUTURES_REST_URL").unwrap_or_else(|_| {
            if use_testnet {
                "https://testnet.binancefuture.com".into()
            } else {
                "https://fapi.binance.com".into()
            }
        });

        let trading_pairs: Vec<String> = env::var("TRADING_PAIRS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            api_key,
            api_secret,
            use_testnet,
            rest_url,
            trading_pairs,
            poll_secs: parse_env("POLL_SECS", 10u64)?,
            dust_threshold: parse_env("DUST_THRESHOLD", DEFAULT_DUST_THRESHOLD)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Config key {key}: {e}")),
        Err(_) => Ok(default),
    }
}
