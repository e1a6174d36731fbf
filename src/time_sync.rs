use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Deserialize)]
struct ServerTimeResponse {
    #[serde(rename = "serverTime")]
    server_time: i64,
}

/// Tracks the offset between local clock and Binance server time so signed
/// request timestamps fall inside the server's recvWindow.
pub struct TimeSync {
    client: Client,
    offset_ms: i64,
}

impl TimeSync {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            offset_ms: 0,
        }
    }

    /// Measure the server/local clock offset over one round trip.
    pub async fn sync(&mut self, base_url: &str) -> Result<()> {
        let url = format!("{}/fapi/v1/time", base_url);

        let local_before = local_ms()?;
        let response: ServerTimeResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("server time request failed")?
            .json()
            .await
            .context("failed to parse server time response")?;
        let local_after = local_ms()?;

        // Assume the server stamped the response mid round trip.
        let round_trip = local_after - local_before;
        let estimated_local = local_before + round_trip / 2;
        self.offset_ms = response.server_time - estimated_local;

        info!(offset_ms = self.offset_ms, "time sync complete");
        Ok(())
    }

    /// Server-synced Unix timestamp in milliseconds.
    pub fn timestamp_ms(&self) -> i64 {
        local_ms().unwrap_or(0) + self.offset_ms
    }
}

impl Default for TimeSync {
    fn default() -> Self {
        Self::new()
    }
}

fn local_ms() -> Result<i64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before Unix epoch")?
        .as_millis() as i64)
}
