//! Position record and its O(1) schedule arithmetic.

use crate::domain::{Address, Amount, IntervalMask, PairKey, Token, TripleKey};
use serde::{Deserialize, Serialize};

/// A user's standing order: split a budget of `from` into equal
/// installments of `rate`, swapped into `to` once per interval while the
/// triple's swap number lies in `[starting_swap, final_swap)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Current owner; reassignable via ownership transfer.
    pub owner: Address,
    /// Source token. Immutable after creation.
    pub from: Token,
    /// Destination token. Immutable after creation.
    pub to: Token,
    /// Swap interval. Immutable after creation.
    pub mask: IntervalMask,
    /// `from`-tokens traded per swap while active.
    pub rate: Amount,
    /// Inclusive lower bound in the triple's swap-number timeline.
    pub starting_swap: u64,
    /// Exclusive upper bound in the triple's swap-number timeline.
    pub final_swap: u64,
    /// The triple's performed-swap count at creation or last mutation;
    /// anchors the accumulated-ratio lookup.
    pub last_updated_swap: u64,
    /// Swapped amount already accounted for before the most recent
    /// modification; folded into future entitlement computations.
    pub carry: Amount,
    /// Part of the committed budget below one rate unit (floor-division
    /// remainder); held in custody and returned at termination.
    pub residue: Amount,
}

impl Position {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.from.clone(), self.to.clone())
    }

    pub fn triple(&self) -> TripleKey {
        TripleKey::new(self.from.clone(), self.to.clone(), self.mask)
    }

    /// Swaps this position has left, given the triple's performed count.
    pub fn remaining_swaps(&self, performed_swaps: u64) -> u64 {
        let scheduled = self.final_swap - self.starting_swap;
        let executed = performed_swaps.saturating_sub(self.starting_swap);
        scheduled.saturating_sub(executed)
    }

    /// Swaps of this position's current schedule that have already run.
    pub fn executed_swaps(&self, performed_swaps: u64) -> u64 {
        let scheduled = self.final_swap - self.starting_swap;
        performed_swaps
            .saturating_sub(self.starting_swap)
            .min(scheduled)
    }

    /// Principal not yet traded: `remaining_swaps * rate`.
    pub fn unswapped(&self, performed_swaps: u64) -> Amount {
        self.rate.times(self.remaining_swaps(performed_swaps))
    }
}
