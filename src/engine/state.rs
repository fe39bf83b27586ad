//! Per-triple aggregate state and the per-pair active-interval bitmaps.

use crate::domain::{Amount, IntervalMask, IntervalSet, PairKey, Position, Timestamp, TripleKey};
use std::collections::HashMap;

/// Aggregate state of one (from, to, interval) stream.
///
/// `performed_swaps` names the current swap number; `next_amount` is the
/// total rate entering that swap, `next_to_next_amount` the total deferred
/// one swap further. `delta` records rate drop-offs keyed by the swap
/// number at which they apply, and `accum` the accumulated per-unit price
/// series (`accum[0] = 0` by convention, entries for every executed swap).
#[derive(Debug, Clone, Default)]
pub struct TripleState {
    pub performed_swaps: u64,
    pub next_amount: Amount,
    pub next_to_next_amount: Amount,
    pub last_swapped_at: Timestamp,
    delta: HashMap<u64, Amount>,
    accum: HashMap<u64, Amount>,
}

impl TripleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated ratio at swap number `n`; zero for `n == 0` and for
    /// anything not yet recorded.
    pub fn accum_at(&self, n: u64) -> Amount {
        if n == 0 {
            return Amount::ZERO;
        }
        self.accum.get(&n).copied().unwrap_or(Amount::ZERO)
    }

    pub fn record_accum(&mut self, n: u64, value: Amount) {
        self.accum.insert(n, value);
    }

    pub fn add_delta(&mut self, n: u64, rate: Amount) {
        *self.delta.entry(n).or_insert(Amount::ZERO) += rate;
    }

    pub fn sub_delta(&mut self, n: u64, rate: Amount) {
        if let Some(entry) = self.delta.get_mut(&n) {
            *entry -= rate;
            if entry.is_zero() {
                self.delta.remove(&n);
            }
        }
    }

    /// Remove and return the delta scheduled at swap number `n`.
    pub fn take_delta(&mut self, n: u64) -> Amount {
        self.delta.remove(&n).unwrap_or(Amount::ZERO)
    }

    /// Sum of every still-scheduled delta entry.
    pub fn scheduled_delta_total(&self) -> Amount {
        self.delta.values().fold(Amount::ZERO, |acc, &v| acc + v)
    }

    /// True while any position is active or deferred on this triple.
    pub fn has_pending(&self) -> bool {
        !self.next_amount.is_zero() || !self.next_to_next_amount.is_zero()
    }

    /// A position's swapped entitlement, reconstructed from the
    /// accumulated-ratio series and the position's own constants.
    pub fn swapped_for(&self, position: &Position, magnitude_from: Amount) -> Amount {
        let fence = self.performed_swaps.min(position.final_swap);
        if position.last_updated_swap > fence {
            return Amount::ZERO;
        }
        if position.last_updated_swap == fence {
            return position.carry;
        }
        let since = position.last_updated_swap.max(position.starting_swap);
        let ratio_delta = self.accum_at(fence) - self.accum_at(since);
        ratio_delta * position.rate / magnitude_from + position.carry
    }
}

/// Lazily populated store of triple states. Entries are never removed:
/// the swap counter must survive empty periods so the accumulated-ratio
/// series stays continuous.
#[derive(Debug, Default)]
pub struct TripleStore {
    triples: HashMap<TripleKey, TripleState>,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TripleKey) -> Option<&TripleState> {
        self.triples.get(key)
    }

    pub fn get_mut(&mut self, key: &TripleKey) -> Option<&mut TripleState> {
        self.triples.get_mut(key)
    }

    /// Fetch the state for `key`, creating it on first reference.
    pub fn entry(&mut self, key: &TripleKey) -> &mut TripleState {
        self.triples.entry(key.clone()).or_default()
    }

    /// Performed-swap count; zero for a triple that was never touched.
    pub fn performed_swaps(&self, key: &TripleKey) -> u64 {
        self.triples
            .get(key)
            .map(|s| s.performed_swaps)
            .unwrap_or(0)
    }
}

/// Per-pair bitmap of intervals holding at least one active or deferred
/// position.
#[derive(Debug, Default)]
pub struct ActiveIntervals {
    pairs: HashMap<PairKey, IntervalSet>,
}

impl ActiveIntervals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pair: &PairKey) -> IntervalSet {
        self.pairs.get(pair).copied().unwrap_or_default()
    }

    pub fn set(&mut self, pair: &PairKey, mask: IntervalMask) {
        self.pairs.entry(pair.clone()).or_default().insert(mask);
    }

    pub fn clear(&mut self, pair: &PairKey, mask: IntervalMask) {
        if let Some(set) = self.pairs.get_mut(pair) {
            set.remove(mask);
            if set.is_empty() {
                self.pairs.remove(pair);
            }
        }
    }
}
