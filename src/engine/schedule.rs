//! Delta accounting and the window classifier.
//!
//! `add_to_delta` / `remove_from_delta` keep the rolling next and
//! next-to-next amounts consistent with the set of live positions, and
//! `time_until_threshold` decides whether a rate entering the books joins
//! the imminent swap or defers past it.

use super::state::{ActiveIntervals, TripleStore};
use crate::domain::{Amount, IntervalMask, IntervalSet, PairKey, Position, Timestamp, TripleKey};

/// Result of probing a pair's live swap windows for a candidate interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowProbe {
    /// The candidate's own interval is inside a live swap window.
    pub inside_live_window: bool,
    /// Earliest live window end, minus the threshold guard.
    pub threshold: u64,
}

/// Probe every interval that is active on the pair, plus the candidate's
/// own, and find which are inside a live swap window right now.
///
/// A window for interval `i` runs from the next-swap start (one interval
/// past the last swap, clamped to the current aligned window) to one
/// interval later. The candidate's own interval counts even when it has
/// no pending amount yet.
pub fn time_until_threshold(
    triples: &TripleStore,
    active: &ActiveIntervals,
    pair: &PairKey,
    self_mask: IntervalMask,
    now: Timestamp,
    guard_secs: u64,
) -> WindowProbe {
    let candidates = active.get(pair).with(self_mask.into());
    let mut in_swap = IntervalSet::empty();
    let mut boundary = u64::MAX;

    for mask in candidates.iter() {
        let interval = mask.seconds();
        let key = TripleKey::from_pair(pair, mask);
        let (last_swapped_at, pending_next) = triples
            .get(&key)
            .map(|s| (s.last_swapped_at.as_secs(), !s.next_amount.is_zero()))
            .unwrap_or((0, false));

        let window_start = now.window_start(interval);
        let next_swap_start = if last_swapped_at == 0 {
            window_start
        } else {
            (last_swapped_at / interval + 1) * interval
        }
        .max(window_start);
        let window_end = next_swap_start + interval;

        let t = now.as_secs();
        if t > next_swap_start && t < window_end && (pending_next || mask == self_mask) {
            in_swap.insert(mask);
            boundary = boundary.min(window_end);
        }
    }

    WindowProbe {
        inside_live_window: in_swap.contains(self_mask),
        threshold: boundary.saturating_sub(guard_secs),
    }
}

/// Register a new rate on the triple, deciding whether it joins the next
/// swap or is deferred to the one after. Returns the final (start, end)
/// swap range, shifted by one when deferred.
pub fn add_to_delta(
    triples: &mut TripleStore,
    active: &ActiveIntervals,
    triple: &TripleKey,
    rate: Amount,
    mut start: u64,
    mut end: u64,
    now: Timestamp,
    guard_secs: u64,
) -> (u64, u64) {
    let probe = time_until_threshold(triples, active, &triple.pair(), triple.mask, now, guard_secs);
    let deferred = probe.inside_live_window && now.as_secs() > probe.threshold;

    let state = triples.entry(triple);
    if deferred {
        start += 1;
        end += 1;
        state.next_to_next_amount += rate;
    } else {
        state.next_amount += rate;
    }
    state.add_delta(end + 1, rate);

    tracing::debug!(%triple, deferred, start, end, "scheduled rate");
    (start, end)
}

/// Take a position's rate back out of the rolling amounts. A position
/// whose swaps have all run contributes nothing and is left alone.
pub fn remove_from_delta(triples: &mut TripleStore, position: &Position) {
    let key = position.triple();
    let Some(state) = triples.get_mut(&key) else {
        return;
    };
    if position.final_swap <= state.performed_swaps {
        return;
    }
    if position.starting_swap > state.performed_swaps {
        state.next_to_next_amount -= position.rate;
    } else {
        state.next_amount -= position.rate;
    }
    state.sub_delta(position.final_swap + 1, position.rate);
}
