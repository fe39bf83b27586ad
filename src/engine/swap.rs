//! Swap engine: aggregate the pair's due intervals, run the external
//! trade, and register the delivered output into the accumulated-ratio
//! series.

use super::state::TripleState;
use super::{Engine, Event};
use crate::domain::{Address, Amount, IntervalMask, IntervalSet, PairKey, Token, TripleKey};
use crate::error::EngineError;
use serde_json::Value;

/// One pair in an operator swap batch. `amount` is the operator-declared
/// aggregate; it must match what the engine computes.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub from: Token,
    pub to: Token,
    pub amount: Amount,
    pub min_out: Amount,
    pub exec_data: Value,
}

/// What the next swap of a pair would aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NextSwapInfo {
    pub total_input: Amount,
    pub intervals_in_swap: IntervalSet,
    pub operator_reward: Amount,
    pub platform_fee: Amount,
}

/// Result of one executed pair swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSwapOutcome {
    pub from: Token,
    pub to: Token,
    pub intervals_in_swap: IntervalSet,
    pub total_input: Amount,
    pub delivered: Amount,
    pub operator_reward: Amount,
    pub platform_fee: Amount,
}

impl Engine {
    /// Sum the net input of every interval whose window has opened,
    /// iterating low to high and stopping at the first un-open window so
    /// aligned intervals execute together.
    pub(crate) fn aggregate(&self, pair: &PairKey) -> NextSwapInfo {
        let now = self.now().as_secs();
        let mut info = NextSwapInfo::default();

        for mask in self.active.get(pair).iter() {
            let interval = mask.seconds();
            let key = TripleKey::from_pair(pair, mask);
            let Some(state) = self.triples.get(&key) else {
                continue;
            };
            let next_open = (state.last_swapped_at.as_secs() / interval + 1) * interval;
            if next_open > now {
                // Coalescing rule: any longer interval's window sits at or
                // above this one, so nothing further can be due either.
                tracing::debug!(%key, next_open, now, "window not open, stopping aggregation");
                break;
            }
            if !state.next_amount.is_zero() {
                info.intervals_in_swap.insert(mask);
                let (net, fee_gross) = state.next_amount.split_bps(self.swap_fee_for(mask));
                let (reward, platform) = fee_gross.split_bps(self.platform_fee_ratio_bps);
                info.total_input += net;
                info.operator_reward += reward;
                info.platform_fee += platform;
            }
        }

        if info.total_input.is_zero() {
            info.intervals_in_swap = IntervalSet::empty();
        }
        info
    }

    /// Execute a batch of pair swaps. Every pair is validated against the
    /// engine's own aggregation before the first trade runs; fee and
    /// reward transfers follow each pair's registration.
    pub fn swap(
        &mut self,
        caller: &Address,
        batch: Vec<SwapRequest>,
        reward_recipient: &Address,
    ) -> Result<Vec<PairSwapOutcome>, EngineError> {
        self.ensure_not_paused()?;
        self.ensure_swap_executor(caller)?;

        let mut plans = Vec::with_capacity(batch.len());
        for request in &batch {
            let pair = PairKey::new(request.from.clone(), request.to.clone());
            let info = self.aggregate(&pair);
            if info.total_input.is_zero() || info.intervals_in_swap.is_empty() {
                return Err(EngineError::NoAvailableSwap);
            }
            if request.amount != info.total_input {
                return Err(EngineError::InvalidSwapAmount);
            }
            plans.push((pair, info));
        }

        let mut outcomes = Vec::with_capacity(batch.len());
        for (request, (pair, info)) in batch.iter().zip(plans) {
            let outcome = self.execute_pair(request, &pair, info, reward_recipient)?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Operator-driven bookkeeping advance for a triple whose current
    /// window is empty but which holds a deferred amount.
    pub fn blank_swap(
        &mut self,
        caller: &Address,
        from: Token,
        to: Token,
        mask: IntervalMask,
    ) -> Result<u64, EngineError> {
        self.ensure_not_paused()?;
        self.ensure_swap_executor(caller)?;

        let key = TripleKey::new(from.clone(), to.clone(), mask);
        let performed = {
            let state = self
                .triples
                .get_mut(&key)
                .ok_or(EngineError::InvalidBlankSwap)?;
            if !state.next_amount.is_zero() || state.next_to_next_amount.is_zero() {
                return Err(EngineError::InvalidBlankSwap);
            }
            Self::advance_blank(state)
        };

        self.emit(Event::BlankSwapped {
            from,
            to,
            interval_seconds: mask.seconds(),
            performed_swaps: performed,
        });
        Ok(performed)
    }

    fn execute_pair(
        &mut self,
        request: &SwapRequest,
        pair: &PairKey,
        info: NextSwapInfo,
        reward_recipient: &Address,
    ) -> Result<PairSwapOutcome, EngineError> {
        // One-shot allowance for the proxy; any remainder after partial
        // consumption is left standing.
        self.custody
            .approve(&pair.from, &self.swap_proxy, info.total_input)
            .map_err(|e| EngineError::Custody(e.to_string()))?;

        let before = self.custody.balance_of(&pair.to, &self.self_address);
        self.executor
            .execute(&pair.from, &pair.to, info.total_input, &request.exec_data)
            .map_err(|e| EngineError::SwapCallFailed(e.to_string()))?;
        let after = self.custody.balance_of(&pair.to, &self.self_address);

        let delivered = after.checked_sub(before).unwrap_or(Amount::ZERO);
        if delivered < request.min_out {
            return Err(EngineError::InvalidReturnAmount);
        }

        self.register(pair, info.total_input, delivered, info.intervals_in_swap);

        if !info.platform_fee.is_zero() {
            self.custody
                .pay(&pair.from, &self.fee_vault, info.platform_fee)
                .map_err(|e| EngineError::Custody(e.to_string()))?;
        }
        if !info.operator_reward.is_zero() {
            self.custody
                .pay(&pair.from, reward_recipient, info.operator_reward)
                .map_err(|e| EngineError::Custody(e.to_string()))?;
        }

        let outcome = PairSwapOutcome {
            from: pair.from.clone(),
            to: pair.to.clone(),
            intervals_in_swap: info.intervals_in_swap,
            total_input: info.total_input,
            delivered,
            operator_reward: info.operator_reward,
            platform_fee: info.platform_fee,
        };
        self.emit(Event::Swapped {
            from: outcome.from.clone(),
            to: outcome.to.clone(),
            intervals: outcome.intervals_in_swap.bits(),
            total_input: outcome.total_input,
            delivered: outcome.delivered,
            operator_reward: outcome.operator_reward,
            platform_fee: outcome.platform_fee,
        });
        Ok(outcome)
    }

    /// Advance every included interval by one swap, appending to its
    /// accumulated-ratio series. Intervals with nothing in the current
    /// window but a deferred amount take an implicit blank advance.
    fn register(
        &mut self,
        pair: &PairKey,
        total_input: Amount,
        delivered: Amount,
        intervals_in_swap: IntervalSet,
    ) {
        let now = self.now();
        let magnitude_from = self.magnitude(&pair.from);
        let masks = self.active.get(pair);

        for mask in masks.iter() {
            let fee_bps = self.swap_fee_for(mask);
            let key = TripleKey::from_pair(pair, mask);
            let Some(state) = self.triples.get_mut(&key) else {
                continue;
            };

            if intervals_in_swap.contains(mask) && !state.next_amount.is_zero() {
                let (net, _) = state.next_amount.split_bps(fee_bps);
                let delivered_for_interval = delivered * net * magnitude_from / total_input;
                let price = delivered_for_interval / state.next_amount;

                let swap_number = state.performed_swaps + 1;
                let accum = state.accum_at(state.performed_swaps) + price;
                state.record_accum(swap_number, accum);
                state.performed_swaps = swap_number;

                let drop_off = state.take_delta(state.performed_swaps + 1);
                state.next_amount = state.next_amount + state.next_to_next_amount - drop_off;
                state.next_to_next_amount = Amount::ZERO;
                state.last_swapped_at = now;

                if state.next_amount.is_zero() {
                    self.active.clear(pair, mask);
                }
            } else if state.next_amount.is_zero() && !state.next_to_next_amount.is_zero() {
                Self::advance_blank(state);
            }
        }
    }

    /// The Case-B bookkeeping step: copy the accumulated ratio forward and
    /// promote the deferred amount. The last-swap timestamp is left alone;
    /// promotion is not a real swap.
    fn advance_blank(state: &mut TripleState) -> u64 {
        let swap_number = state.performed_swaps + 1;
        let accum = state.accum_at(state.performed_swaps);
        state.record_accum(swap_number, accum);
        state.next_amount = state.next_to_next_amount;
        state.next_to_next_amount = Amount::ZERO;
        state.performed_swaps = swap_number;
        swap_number
    }
}
