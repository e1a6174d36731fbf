/// identity.rs — Stable Position Fingerprints
///
/// A logical position keeps its identity across Opened → AddedTo →
/// PartiallyClosed transitions even though entry price and size change.
/// The fingerprint therefore digests ONLY `(ticker, direction)` — the
/// canonicalization step below selects and orders those two fields
/// explicitly, so later additions to [`Position`] can never leak into the
/// hash through default formatting or struct layout.
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{Direction, Position};

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Canonical encoding of the identity fields failed. Callers must treat
    /// this as fatal for the call — never substitute a default fingerprint,
    /// which would silently merge unrelated positions.
    #[error("failed to encode identity fields: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Opaque fingerprint of a logical position identity.
///
/// Equal exactly when `(ticker, direction)` are equal. Stable across
/// process restarts, usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionId([u8; 32]);

impl PositionId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// The exact byte layout fed to the digest. Field order is fixed by this
/// struct definition; neither field is a float, so the encoding has no
/// variable-width numeric formatting to go non-canonical on.
#[derive(Serialize)]
struct IdentityKey<'a> {
    ticker: &'a str,
    direction: Direction,
}

/// Fingerprint for the logical position `(ticker, direction)`.
///
/// Deterministic: same input yields the same id in this or any fresh
/// process. Mutable fields (`event`, `entry_price`, `amount`) are not part
/// of the input and cannot influence the result.
pub fn identity_of(ticker: &str, direction: Direction) -> Result<PositionId, IdentityError> {
    let key = IdentityKey { ticker, direction };
    let encoded = serde_json::to_vec(&key)?;
    Ok(PositionId(Sha256::digest(&encoded).into()))
}

impl Position {
    /// Fingerprint of this position's logical identity.
    pub fn id(&self) -> Result<PositionId, IdentityError> {
        identity_of(&self.ticker, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PositionEvent;

    fn pos(
        event: PositionEvent,
        direction: Direction,
        ticker: &str,
        entry_price: f64,
        amount: f64,
    ) -> Position {
        Position {
            event,
            direction,
            ticker: ticker.to_string(),
            entry_price,
            amount,
        }
    }

    #[test]
    fn identical_positions_share_id() {
        let p1 = pos(PositionEvent::Opened, Direction::Long, "BTCUSDT", 20_000.0, 1.0);
        let p2 = pos(PositionEvent::Opened, Direction::Long, "BTCUSDT", 20_000.0, 1.0);
        assert_eq!(p1.id().unwrap(), p2.id().unwrap());
    }

    #[test]
    fn added_to_at_same_price_keeps_id() {
        let p1 = pos(PositionEvent::Opened, Direction::Long, "BTCUSDT", 20_000.0, 1.0);
        let p2 = pos(PositionEvent::AddedTo, Direction::Long, "BTCUSDT", 20_000.0, 2.0);
        assert_eq!(p1.id().unwrap(), p2.id().unwrap());
    }

    #[test]
    fn added_to_at_different_price_keeps_id() {
        let p1 = pos(PositionEvent::Opened, Direction::Long, "BTCUSDT", 20_000.0, 1.0);
        let p2 = pos(PositionEvent::AddedTo, Direction::Long, "BTCUSDT", 25_000.0, 2.0);
        assert_eq!(p1.id().unwrap(), p2.id().unwrap());
    }

    #[test]
    fn partially_closed_keeps_id() {
        let p1 = pos(PositionEvent::Opened, Direction::Long, "BTCUSDT", 20_000.0, 1.0);
        let p2 = pos(PositionEvent::PartiallyClosed, Direction::Long, "BTCUSDT", 20_000.0, 0.5);
        assert_eq!(p1.id().unwrap(), p2.id().unwrap());
    }

    #[test]
    fn different_tickers_differ() {
        let p1 = pos(PositionEvent::Opened, Direction::Long, "BTCUSDT", 20_000.0, 1.0);
        let p2 = pos(PositionEvent::Opened, Direction::Long, "ETHUSDT", 20_000.0, 1.0);
        assert_ne!(p1.id().unwrap(), p2.id().unwrap());
    }

    #[test]
    fn different_directions_differ() {
        let p1 = pos(PositionEvent::Opened, Direction::Long, "BTCUSDT", 20_000.0, 1.0);
        let p2 = pos(PositionEvent::Opened, Direction::Short, "BTCUSDT", 20_000.0, 1.0);
        assert_ne!(p1.id().unwrap(), p2.id().unwrap());
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let a = identity_of("BTCUSDT", Direction::Long).unwrap();
        let b = identity_of("BTCUSDT", Direction::Long).unwrap();
        assert_eq!(a, b);
        // 32-byte digest, 64 hex chars.
        assert_eq!(a.to_string().len(), 64);
    }

    #[test]
    fn hex_display_matches_bytes() {
        let id = identity_of("SOLUSDT", Direction::Short).unwrap();
        assert_eq!(id.to_string(), hex::encode(id.as_bytes()));
    }
}
