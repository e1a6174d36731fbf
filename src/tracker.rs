/// tracker.rs — Position Lifecycle Tracking
///
/// Owns the map of live positions keyed by fingerprint and decides, per
/// snapshot, which lifecycle transition occurred. The tracker is the single
/// owner of its records; callers feeding multiple exchange connections must
/// route snapshots for one instrument through one tracker instance.
use ahash::AHashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info};

use crate::identity::{identity_of, IdentityError, PositionId};
use crate::models::{Direction, Position, PositionEvent, RawPositionSnapshot};

#[derive(Debug, Default)]
pub struct PositionTracker {
    positions: AHashMap<PositionId, Position>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one snapshot for `ticker` with the reported absolute size.
    ///
    /// Returns the lifecycle transition it produced, or `None` when nothing
    /// changed (same size, possibly a new mark price). A fingerprint failure
    /// propagates untouched — a defaulted identity would falsely aggregate
    /// unrelated positions.
    pub fn apply(
        &mut self,
        ticker: &str,
        snapshot: &RawPositionSnapshot,
        amount: f64,
    ) -> Result<Option<PositionEvent>, IdentityError> {
        let direction = snapshot.direction();

        if amount == 0.0 {
            return self.close(ticker, direction);
        }

        let id = identity_of(ticker, direction)?;

        match self.positions.entry(id) {
            Entry::Vacant(slot) => {
                info!(%id, ticker, ?direction, amount, entry = snapshot.entry_price, "position opened");
                slot.insert(Position {
                    event: PositionEvent::Opened,
                    direction,
                    ticker: ticker.to_owned(),
                    entry_price: snapshot.entry_price,
                    amount,
                });
                Ok(Some(PositionEvent::Opened))
            }
            Entry::Occupied(mut occupied) => {
                let pos = occupied.get_mut();
                if amount > pos.amount {
                    info!(%id, ticker, from = pos.amount, to = amount, "position added to");
                    pos.event = PositionEvent::AddedTo;
                    pos.entry_price = snapshot.entry_price;
                    pos.amount = amount;
                    Ok(Some(PositionEvent::AddedTo))
                } else if amount < pos.amount {
                    info!(%id, ticker, from = pos.amount, to = amount, "position partially closed");
                    pos.event = PositionEvent::PartiallyClosed;
                    // Entry price is unchanged by a partial close; the
                    // exchange keeps reporting the same average.
                    pos.amount = amount;
                    Ok(Some(PositionEvent::PartiallyClosed))
                } else {
                    debug!(%id, ticker, amount, "snapshot with unchanged size");
                    pos.entry_price = snapshot.entry_price;
                    Ok(None)
                }
            }
        }
    }

    /// Remove the tracked position on `ticker` whose exposure returned to
    /// zero.
    ///
    /// A flat positionRisk entry reports `entryPrice=0, unRealizedProfit=0`
    /// with the live mark price, so the direction inferred from it says
    /// nothing about the side that was actually held. Try the inferred
    /// side's fingerprint first, then the opposite, so a tracked position
    /// is removed whichever way it pointed.
    fn close(
        &mut self,
        ticker: &str,
        inferred: Direction,
    ) -> Result<Option<PositionEvent>, IdentityError> {
        for direction in [inferred, inferred.opposite()] {
            let id = identity_of(ticker, direction)?;
            if let Some(closed) = self.positions.remove(&id) {
                info!(%id, ticker, ?direction, amount = closed.amount, "position closed");
                return Ok(Some(PositionEvent::Closed));
            }
        }
        Ok(None)
    }

    pub fn get(&self, id: &PositionId) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn open_positions(&self) -> impl Iterator<Item = (&PositionId, &Position)> {
        self.positions.iter()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
