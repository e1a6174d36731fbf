/// exchange.rs — Binance USDT-M Futures Position Snapshots
///
/// Polls the signed `/fapi/v2/positionRisk` endpoint and normalises its
/// string-encoded numerics into [`RawPositionSnapshot`]s for the tracker.
///
/// BINANCE SIGNED REQUEST FLOW:
///   1. Build query string with required params
///   2. Append timestamp (server-synced via /fapi/v1/time)
///   3. Sign query string with HMAC-SHA256 using the API secret
///   4. GET with X-MBX-APIKEY header, signature appended to the query
use anyhow::{Context, Result};
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, error};

use crate::models::RawPositionSnapshot;

type HmacSha256 = Hmac<Sha256>;

/// One positionRisk entry as the API returns it (numerics are strings).
#[derive(Deserialize, Debug)]
struct PositionRiskEntry {
    symbol: String,
    #[serde(rename = "positionAmt")]
    position_amt: String,
    #[serde(rename = "entryPrice")]
    entry_price: String,
    #[serde(rename = "markPrice")]
    mark_price: String,
    #[serde(rename = "unRealizedProfit")]
    unrealized_profit: String,
}

#[derive(Deserialize, Debug)]
struct BinanceError {
    code: i64,
    msg: String,
}

/// A normalised per-instrument observation: reported size plus the raw
/// numeric triple direction inference consumes.
#[derive(Debug, Clone)]
pub struct AccountPosition {
    pub ticker: String,
    /// Absolute position size. Zero means exposure has returned to zero.
    pub amount: f64,
    pub snapshot: RawPositionSnapshot,
}

pub struct PositionRiskClient {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl PositionRiskClient {
    pub fn new(api_key: &str, api_secret: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("HTTP client build failed")?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            api_secret: api_secret.to_owned(),
            base_url: base_url.to_owned(),
        })
    }

    /// Sign a query string with HMAC-SHA256.
    fn sign(&self, query: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .context("HMAC key error")?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Fetch current positions, optionally restricted to one symbol.
    ///
    /// Entries with |positionAmt| below `dust_threshold` are reported with
    /// amount 0 so the tracker sees the exposure as closed.
    pub async fn fetch_positions(
        &self,
        symbol: Option<&str>,
        timestamp_ms: i64,
        dust_threshold: f64,
    ) -> Result<Vec<AccountPosition>> {
        let params = match symbol {
            Some(s) => format!("symbol={}&timestamp={}", s, timestamp_ms),
            None => format!("timestamp={}", timestamp_ms),
        };
        let signature = self.sign(&params)?;
        let url = format!(
            "{}/fapi/v2/positionRisk?{}&signature={}",
            self.base_url, params, signature
        );

        let resp = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .context("positionRisk request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read response body")?;

        if status != StatusCode::OK {
            match serde_json::from_str::<BinanceError>(&body) {
                Ok(e) => error!("Binance API error {}: {}", e.code, e.msg),
                Err(_) => error!("HTTP {} — body: {}", status, body),
            }
            anyhow::bail!("positionRisk failed: HTTP {}", status);
        }

        let entries: Vec<PositionRiskEntry> =
            serde_json::from_str(&body).context("failed to parse positionRisk")?;

        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            let position = parse_entry(&entry, dust_threshold)
                .with_context(|| format!("bad positionRisk entry for {}", entry.symbol))?;
            debug!(
                ticker = %position.ticker,
                amount = position.amount,
                mark = position.snapshot.mark_price,
                "position snapshot"
            );
            out.push(position);
        }
        Ok(out)
    }
}

fn parse_entry(entry: &PositionRiskEntry, dust_threshold: f64) -> Result<AccountPosition> {
    let amt: f64 = entry.position_amt.parse().context("positionAmt")?;
    let entry_price: f64 = entry.entry_price.parse().context("entryPrice")?;
    let mark_price: f64 = entry.mark_price.parse().context("markPrice")?;
    let unrealized_pnl: f64 = entry.unrealized_profit.parse().context("unRealizedProfit")?;

    let amount = if amt.abs() < dust_threshold { 0.0 } else { amt.abs() };

    Ok(AccountPosition {
        ticker: entry.symbol.clone(),
        amount,
        snapshot: RawPositionSnapshot {
            entry_price,
            mark_price,
            unrealized_pnl,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_matches_binance_reference_vector() {
        // Example from the Binance API signature docs.
        let client = PositionRiskClient::new(
            "key",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
            "https://example.invalid",
        )
        .unwrap();
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&\
                     quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            client.sign(query).unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn parse_entry_normalises_strings() {
        let entry = PositionRiskEntry {
            symbol: "BTCUSDT".into(),
            position_amt: "-0.250".into(),
            entry_price: "20000.0".into(),
            mark_price: "19500.00".into(),
            unrealized_profit: "125.00000000".into(),
        };
        let pos = parse_entry(&entry, 1e-9).unwrap();
        assert_eq!(pos.ticker, "BTCUSDT");
        assert_eq!(pos.amount, 0.25);
        assert_eq!(pos.snapshot.entry_price, 20_000.0);
        assert_eq!(pos.snapshot.unrealized_pnl, 125.0);
    }

    #[test]
    fn dust_positions_report_zero_amount() {
        let entry = PositionRiskEntry {
            symbol: "ETHUSDT".into(),
            position_amt: "0.00000001".into(),
            entry_price: "0.0".into(),
            mark_price: "1500.0".into(),
            unrealized_profit: "0.0".into(),
        };
        let pos = parse_entry(&entry, 1e-6).unwrap();
        assert_eq!(pos.amount, 0.0);
    }

    #[test]
    fn malformed_numeric_is_an_error() {
        let entry = PositionRiskEntry {
            symbol: "BTCUSDT".into(),
            position_amt: "not-a-number".into(),
            entry_price: "0".into(),
            mark_price: "0".into(),
            unrealized_profit: "0".into(),
        };
        assert!(parse_entry(&entry, 1e-9).is_err());
    }
}
