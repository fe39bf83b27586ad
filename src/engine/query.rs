//! Read-only projections of engine state.

use super::swap::NextSwapInfo;
use super::Engine;
use crate::domain::{Address, Amount, PairKey, PositionId, Token, TripleKey};
use crate::error::EngineError;
use serde::Serialize;

/// Public view of one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDetails {
    pub owner: Address,
    pub from: Token,
    pub to: Token,
    pub interval_seconds: u64,
    pub rate: Amount,
    pub swaps_executed: u64,
    pub swaps_left: u64,
    pub swapped: Amount,
    pub unswapped: Amount,
}

impl Engine {
    pub fn position_details(&self, id: PositionId) -> Result<PositionDetails, EngineError> {
        let position = self.position(id).ok_or(EngineError::InvalidPosition)?;
        let performed = self.triples.performed_swaps(&position.triple());
        Ok(PositionDetails {
            owner: position.owner.clone(),
            from: position.from.clone(),
            to: position.to.clone(),
            interval_seconds: position.mask.seconds(),
            rate: position.rate,
            swaps_executed: position.executed_swaps(performed),
            swaps_left: position.remaining_swaps(performed),
            swapped: self.swapped_amount(position),
            unswapped: position.unswapped(performed),
        })
    }

    /// Seconds until the pair has a swap to run: zero when an open window
    /// has a pending amount, the earliest future window otherwise,
    /// `u64::MAX` when nothing is scheduled at all.
    pub fn seconds_until_next_swap(&self, pair: &PairKey) -> u64 {
        let now = self.now().as_secs();
        let mut earliest = u64::MAX;

        for mask in self.active.get(pair).iter() {
            let interval = mask.seconds();
            let Some(state) = self.triples.get(&TripleKey::from_pair(pair, mask)) else {
                continue;
            };
            let next_open = (state.last_swapped_at.as_secs() / interval + 1) * interval;
            if !state.next_amount.is_zero() {
                if next_open <= now {
                    return 0;
                }
                earliest = earliest.min(next_open - now);
            } else if !state.next_to_next_amount.is_zero() && next_open > now {
                earliest = earliest.min(next_open - now);
            }
        }
        earliest
    }

    /// What `swap` would aggregate for the pair right now, without
    /// executing anything.
    pub fn next_swap_info(&self, pair: &PairKey) -> NextSwapInfo {
        self.aggregate(pair)
    }

    /// Total swapped-but-unwithdrawn entitlement of a position, in the
    /// destination token.
    pub fn swapped_balance(&self, id: PositionId) -> Result<Amount, EngineError> {
        let position = self.position(id).ok_or(EngineError::InvalidPosition)?;
        Ok(self.swapped_amount(position))
    }
}
