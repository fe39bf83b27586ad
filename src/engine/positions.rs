//! Position manager: create, modify, terminate, withdraw, transfer.

use super::{schedule, Engine, Event};
use crate::domain::{Address, Amount, IntervalMask, Position, PositionId, Token, TripleKey};
use crate::error::EngineError;
use std::collections::HashMap;

/// A position creation request as submitted by a user.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub from: Token,
    pub to: Token,
    pub interval_seconds: u64,
    pub amount: Amount,
    pub no_of_swaps: u64,
}

/// Creation request after the validation ladder.
#[derive(Debug, Clone)]
struct ValidatedCreate {
    from: Token,
    to: Token,
    mask: IntervalMask,
    amount: Amount,
    no_of_swaps: u64,
    rate: Amount,
}

impl Engine {
    /// Create a position: pull the budget into custody, schedule its rate
    /// on the triple, and hand back the new id.
    pub fn create_position(
        &mut self,
        caller: &Address,
        request: CreateRequest,
    ) -> Result<PositionId, EngineError> {
        self.ensure_not_paused()?;
        let validated = self.validate_create(&request)?;
        self.custody
            .pull(&validated.from, caller, validated.amount)
            .map_err(|e| EngineError::Custody(e.to_string()))?;

        let id = self.apply_create(caller.clone(), &validated);
        let position = &self.positions[&id];
        let event = Event::Created {
            position_id: id,
            owner: caller.clone(),
            from: position.from.clone(),
            to: position.to.clone(),
            interval_seconds: position.mask.seconds(),
            rate: position.rate,
            starting_swap: position.starting_swap,
            final_swap: position.final_swap,
        };
        self.emit(event);
        Ok(id)
    }

    /// Create several positions as one all-or-nothing call: every request
    /// is validated, then funding is checked per token, and only then is
    /// anything pulled or applied.
    pub fn create_positions_batch(
        &mut self,
        caller: &Address,
        requests: Vec<CreateRequest>,
    ) -> Result<Vec<PositionId>, EngineError> {
        self.ensure_not_paused()?;
        let validated: Vec<ValidatedCreate> = requests
            .iter()
            .map(|r| self.validate_create(r))
            .collect::<Result<_, _>>()?;

        let mut totals: HashMap<Token, Amount> = HashMap::new();
        for v in &validated {
            *totals.entry(v.from.clone()).or_insert(Amount::ZERO) += v.amount;
        }
        for (token, total) in &totals {
            let available = self.custody.balance_of(token, caller);
            if available < *total {
                return Err(EngineError::Custody(format!(
                    "insufficient balance of {} for batch: requested {}, available {}",
                    token, total, available
                )));
            }
        }

        for v in &validated {
            self.custody
                .pull(&v.from, caller, v.amount)
                .map_err(|e| EngineError::Custody(e.to_string()))?;
        }
        let ids: Vec<PositionId> = validated
            .iter()
            .map(|v| self.apply_create(caller.clone(), v))
            .collect();
        if !ids.is_empty() {
            self.emit(Event::CreatedBatched {
                position_ids: ids.clone(),
            });
        }
        Ok(ids)
    }

    /// Reinterpret a position as if recreated with the residual unswapped
    /// balance adjusted by `amount` and a fresh schedule of `no_of_swaps`.
    pub fn modify_position(
        &mut self,
        caller: &Address,
        id: PositionId,
        amount: Amount,
        no_of_swaps: u64,
        is_increase: bool,
    ) -> Result<(), EngineError> {
        self.ensure_not_paused()?;
        let position = self
            .positions
            .get(&id)
            .ok_or(EngineError::InvalidPosition)?
            .clone();
        if &position.owner != caller {
            return Err(EngineError::UnauthorizedCaller);
        }

        let triple = position.triple();
        let performed = self.triples.performed_swaps(&triple);
        let remaining = position.remaining_swaps(performed);
        let unswapped_old = position.rate.times(remaining);
        let unswapped_new = if is_increase {
            unswapped_old + amount
        } else {
            unswapped_old
                .checked_sub(amount)
                .ok_or(EngineError::InvalidAmount)?
        };

        if unswapped_new == unswapped_old && no_of_swaps == remaining {
            return Err(EngineError::NoChanges);
        }
        let has_schedule = no_of_swaps >= 1 && no_of_swaps <= self.max_no_of_swaps;
        if !unswapped_new.is_zero() != has_schedule {
            return Err(EngineError::InvalidNoOfSwaps);
        }
        let new_rate = if no_of_swaps > 0 {
            unswapped_new / Amount::from(no_of_swaps)
        } else {
            Amount::ZERO
        };

        // Pull before touching state so a funding failure changes nothing.
        if is_increase && !amount.is_zero() {
            self.custody
                .pull(&position.from, caller, amount)
                .map_err(|e| EngineError::Custody(e.to_string()))?;
        }

        // Freeze earnings so the accumulated-ratio anchor can move.
        let carry = self.swapped_amount(&position);
        schedule::remove_from_delta(&mut self.triples, &position);

        let now = self.now();
        let guard = self.threshold_guard_secs;
        let mut updated = position.clone();
        updated.carry = carry;
        updated.last_updated_swap = performed;
        updated.rate = new_rate;
        updated.residue = position.residue + (unswapped_new - new_rate.times(no_of_swaps));
        if !new_rate.is_zero() {
            let (start, end) = schedule::add_to_delta(
                &mut self.triples,
                &self.active,
                &triple,
                new_rate,
                performed,
                performed + no_of_swaps,
                now,
                guard,
            );
            updated.starting_swap = start;
            updated.final_swap = end;
            self.active.set(&position.pair(), position.mask);
        } else {
            updated.starting_swap = performed;
            updated.final_swap = performed;
            let empty = self
                .triples
                .get(&triple)
                .map(|s| !s.has_pending())
                .unwrap_or(true);
            if empty {
                self.active.clear(&position.pair(), position.mask);
            }
        }

        let event = Event::Modified {
            position_id: id,
            rate: updated.rate,
            starting_swap: updated.starting_swap,
            final_swap: updated.final_swap,
        };
        self.positions.insert(id, updated);

        if !is_increase && !amount.is_zero() {
            self.custody
                .pay(&position.from, caller, amount)
                .map_err(|e| EngineError::Custody(e.to_string()))?;
        }
        self.emit(event);
        Ok(())
    }

    /// Close a position: pay out both the untraded principal (with its
    /// truncation residue) and the swapped proceeds, then delete it.
    /// Available while paused.
    pub fn terminate_position(
        &mut self,
        caller: &Address,
        id: PositionId,
        recipient: &Address,
    ) -> Result<(Amount, Amount), EngineError> {
        let position = self
            .positions
            .get(&id)
            .ok_or(EngineError::InvalidPosition)?
            .clone();
        if &position.owner != caller {
            return Err(EngineError::UnauthorizedCaller);
        }

        let triple = position.triple();
        let performed = self.triples.performed_swaps(&triple);
        let unswapped = position.unswapped(performed) + position.residue;
        let swapped = self.swapped_amount(&position);

        schedule::remove_from_delta(&mut self.triples, &position);
        let empty = self
            .triples
            .get(&triple)
            .map(|s| !s.has_pending())
            .unwrap_or(true);
        if empty {
            self.active.clear(&position.pair(), position.mask);
        }
        self.positions.remove(&id);

        if !unswapped.is_zero() {
            self.custody
                .pay(&position.from, recipient, unswapped)
                .map_err(|e| EngineError::Custody(e.to_string()))?;
        }
        if !swapped.is_zero() {
            self.custody
                .pay(&position.to, recipient, swapped)
                .map_err(|e| EngineError::Custody(e.to_string()))?;
        }
        self.emit(Event::Terminated {
            position_id: id,
            recipient: recipient.clone(),
            unswapped,
            swapped,
        });
        Ok((unswapped, swapped))
    }

    /// Withdraw the swapped proceeds accrued so far; the position stays
    /// active. Available while paused.
    pub fn withdraw_swapped(
        &mut self,
        caller: &Address,
        id: PositionId,
        recipient: &Address,
    ) -> Result<Amount, EngineError> {
        let position = self
            .positions
            .get(&id)
            .ok_or(EngineError::InvalidPosition)?
            .clone();
        if &position.owner != caller {
            return Err(EngineError::UnauthorizedCaller);
        }

        let swapped = self.swapped_amount(&position);
        if swapped.is_zero() {
            return Err(EngineError::ZeroSwappedTokens);
        }

        let performed = self.triples.performed_swaps(&position.triple());
        let mut updated = position.clone();
        updated.last_updated_swap = performed;
        updated.carry = Amount::ZERO;
        self.positions.insert(id, updated);

        self.custody
            .pay(&position.to, recipient, swapped)
            .map_err(|e| EngineError::Custody(e.to_string()))?;
        self.emit(Event::Withdrawn {
            position_id: id,
            recipient: recipient.clone(),
            swapped,
        });
        Ok(swapped)
    }

    /// Hand the position to a new owner. No other state changes.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        id: PositionId,
        new_owner: Address,
    ) -> Result<(), EngineError> {
        self.ensure_not_paused()?;
        let position = self
            .positions
            .get_mut(&id)
            .ok_or(EngineError::InvalidPosition)?;
        if &position.owner != caller {
            return Err(EngineError::UnauthorizedCaller);
        }
        let previous_owner = std::mem::replace(&mut position.owner, new_owner.clone());
        self.emit(Event::PositionOwnerUpdated {
            position_id: id,
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    /// A position's swapped entitlement under the current accumulated
    /// ratio series.
    pub(crate) fn swapped_amount(&self, position: &Position) -> Amount {
        let magnitude = self.magnitude(&position.from);
        match self.triples.get(&position.triple()) {
            Some(state) => state.swapped_for(position, magnitude),
            None => position.carry,
        }
    }

    fn validate_create(&self, request: &CreateRequest) -> Result<ValidatedCreate, EngineError> {
        if request.from.is_zero() || request.to.is_zero() {
            return Err(EngineError::ZeroAddress);
        }
        if request.amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        if request.no_of_swaps == 0 || request.no_of_swaps > self.max_no_of_swaps {
            return Err(EngineError::InvalidNoOfSwaps);
        }
        if request.from == request.to {
            return Err(EngineError::InvalidToken);
        }
        self.ensure_token_allowed(&request.from)?;
        self.ensure_token_allowed(&request.to)?;
        let mask = IntervalMask::from_seconds(request.interval_seconds)
            .filter(|m| self.allowed_intervals.contains(*m))
            .ok_or(EngineError::InvalidInterval)?;
        let rate = request.amount / Amount::from(request.no_of_swaps);
        if rate.is_zero() {
            return Err(EngineError::InvalidRate);
        }
        Ok(ValidatedCreate {
            from: request.from.clone(),
            to: request.to.clone(),
            mask,
            amount: request.amount,
            no_of_swaps: request.no_of_swaps,
            rate,
        })
    }

    /// Infallible tail of creation: assign the id, schedule the rate, and
    /// store the record.
    fn apply_create(&mut self, owner: Address, validated: &ValidatedCreate) -> PositionId {
        self.total_created_positions += 1;
        let id = PositionId::new(self.total_created_positions);

        let triple = TripleKey::new(
            validated.from.clone(),
            validated.to.clone(),
            validated.mask,
        );
        let performed = self.triples.performed_swaps(&triple);
        let now = self.now();
        let guard = self.threshold_guard_secs;
        let (starting_swap, final_swap) = schedule::add_to_delta(
            &mut self.triples,
            &self.active,
            &triple,
            validated.rate,
            performed,
            performed + validated.no_of_swaps,
            now,
            guard,
        );

        let position = Position {
            owner,
            from: validated.from.clone(),
            to: validated.to.clone(),
            mask: validated.mask,
            rate: validated.rate,
            starting_swap,
            final_swap,
            last_updated_swap: performed,
            carry: Amount::ZERO,
            residue: validated.amount - validated.rate.times(validated.no_of_swaps),
        };
        self.active.set(&position.pair(), validated.mask);
        self.positions.insert(id, position);
        id
    }
}
