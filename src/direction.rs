/// direction.rs — Position Direction Inference
///
/// The exchange reports entry price, mark price and unrealized PnL but not
/// which way the position points. For a long, price rising implies profit
/// and price falling implies loss, so the two signs move together; for a
/// short they move oppositely. Comparing the two booleans recovers the
/// direction from the *consistency* of the signals rather than trusting
/// either alone.
use crate::models::{Direction, RawPositionSnapshot};

/// Infer position direction from the price/PnL sign relationship.
///
/// Total function: any numeric input resolves, including zero and negative
/// prices. Both comparisons are strict `>` — at `mark == entry` the price
/// has not risen, and at `pnl == 0` there is no profit, so a completely
/// flat snapshot resolves to `Long` (both booleans false, hence equal).
pub fn infer_direction(entry_price: f64, mark_price: f64, unrealized_pnl: f64) -> Direction {
    let price_rose = mark_price > entry_price;
    let pnl_positive = unrealized_pnl > 0.0;

    if price_rose == pnl_positive {
        Direction::Long
    } else {
        Direction::Short
    }
}

impl RawPositionSnapshot {
    /// Direction implied by this snapshot.
    pub fn direction(&self) -> Direction {
        infer_direction(self.entry_price, self.mark_price, self.unrealized_pnl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Long, Short};

    #[test]
    fn long_with_positive_pnl() {
        assert_eq!(infer_direction(1000.0, 2000.0, 1000.0), Long);
    }

    #[test]
    fn long_with_negative_pnl() {
        assert_eq!(infer_direction(1000.0, 500.0, -500.0), Long);
    }

    #[test]
    fn short_with_positive_pnl() {
        assert_eq!(infer_direction(1000.0, 500.0, 500.0), Short);
    }

    #[test]
    fn short_with_negative_pnl() {
        assert_eq!(infer_direction(1000.0, 1500.0, -500.0), Short);
    }

    #[test]
    fn flat_price_zero_pnl_resolves_long() {
        // Both comparisons strict: price_rose = false, pnl_positive = false.
        assert_eq!(infer_direction(1000.0, 1000.0, 0.0), Long);
    }

    #[test]
    fn flat_price_with_fee_drag_resolves_short() {
        // Price unchanged but PnL positive: signals disagree.
        assert_eq!(infer_direction(1000.0, 1000.0, 3.0), Short);
    }

    #[test]
    fn zero_and_negative_inputs_still_resolve() {
        // Degenerate inputs never panic or fail to resolve.
        assert_eq!(infer_direction(0.0, 0.0, 0.0), Long);
        assert_eq!(infer_direction(-10.0, -5.0, 5.0), Long);
        assert_eq!(infer_direction(-5.0, -10.0, 5.0), Short);
    }

    #[test]
    fn snapshot_delegates_to_rule() {
        let snap = RawPositionSnapshot {
            entry_price: 1000.0,
            mark_price: 2000.0,
            unrealized_pnl: 1000.0,
        };
        assert_eq!(snap.direction(), Long);
    }
}
