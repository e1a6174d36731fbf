use serde::{Deserialize, Serialize};

/// One observation of a position's raw numeric state from the exchange.
///
/// Binance positionRisk does not report direction directly; it has to be
/// recovered from the sign relationship between price move and PnL
/// (see [`crate::direction::infer_direction`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPositionSnapshot {
    /// Average price at which the position was opened.
    pub entry_price: f64,
    /// Current mark/reference price.
    pub mark_price: f64,
    /// Signed profit/loss at the current mark price.
    pub unrealized_pnl: f64,
}

/// Long profits when price rises, Short when it falls.
/// Every snapshot resolves to one of the two; there is no flat variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

/// How a position changed on the most recent snapshot.
///
/// Describes a transition, not identity: two records with different events
/// can still be the same logical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionEvent {
    Opened,
    AddedTo,
    PartiallyClosed,
    Closed,
}

/// A logical position, mutated in place across its lifetime by the tracker.
///
/// Identity is `(ticker, direction)` only. `event`, `entry_price` and
/// `amount` change as the position is added to or partially closed and must
/// never participate in identity (see [`crate::identity`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Most recent lifecycle transition.
    pub event: PositionEvent,
    pub direction: Direction,
    /// Traded instrument symbol, e.g. "BTCUSDT".
    pub ticker: String,
    /// Average entry price; moves when the position is added to.
    pub entry_price: f64,
    /// Current size; changes on every add / partial close.
    pub amount: f64,
}
