//! Admin-gated runtime configuration.

use super::Engine;
use crate::domain::{Address, IntervalMask, Token, BPS_DENOMINATOR};
use crate::error::EngineError;

impl Engine {
    pub fn pause(&mut self, caller: &Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.paused = true;
        tracing::info!("engine paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.paused = false;
        tracing::info!("engine unpaused");
        Ok(())
    }

    /// Allow a token and register its decimals. Decimals are kept even if
    /// the token is later disallowed, so live positions keep settling.
    pub fn allow_token(
        &mut self,
        caller: &Address,
        token: Token,
        decimals: u32,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if token.is_zero() {
            return Err(EngineError::ZeroAddress);
        }
        self.token_decimals.insert(token.clone(), decimals);
        self.allowed_tokens.insert(token);
        Ok(())
    }

    pub fn disallow_token(&mut self, caller: &Address, token: &Token) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.allowed_tokens.remove(token);
        Ok(())
    }

    pub fn allow_interval(&mut self, caller: &Address, mask: IntervalMask) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.allowed_intervals.insert(mask);
        Ok(())
    }

    pub fn disallow_interval(
        &mut self,
        caller: &Address,
        mask: IntervalMask,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.allowed_intervals.remove(mask);
        Ok(())
    }

    pub fn set_swap_fee(
        &mut self,
        caller: &Address,
        mask: IntervalMask,
        fee_bps: u16,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if fee_bps as u64 > BPS_DENOMINATOR {
            return Err(EngineError::InvalidAmount);
        }
        self.swap_fee_bps[mask.bit_index()] = fee_bps;
        Ok(())
    }

    pub fn set_platform_fee_ratio(
        &mut self,
        caller: &Address,
        ratio_bps: u16,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if ratio_bps as u64 > BPS_DENOMINATOR {
            return Err(EngineError::InvalidAmount);
        }
        self.platform_fee_ratio_bps = ratio_bps;
        Ok(())
    }

    pub fn set_fee_vault(&mut self, caller: &Address, vault: Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if vault.is_zero() {
            return Err(EngineError::ZeroAddress);
        }
        self.fee_vault = vault;
        Ok(())
    }

    pub fn set_max_no_of_swaps(&mut self, caller: &Address, max: u64) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if max < 2 {
            return Err(EngineError::InvalidNoOfSwaps);
        }
        self.max_no_of_swaps = max;
        Ok(())
    }

    pub fn set_threshold_guard(&mut self, caller: &Address, secs: u64) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.threshold_guard_secs = secs;
        Ok(())
    }

    pub fn add_admin(&mut self, caller: &Address, admin: Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.admins.insert(admin);
        Ok(())
    }

    /// The governor cannot be removed; the engine always has at least one
    /// administrator.
    pub fn remove_admin(&mut self, caller: &Address, admin: &Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if admin == &self.governor {
            return Err(EngineError::UnauthorizedCaller);
        }
        self.admins.remove(admin);
        Ok(())
    }

    pub fn add_swap_executor(
        &mut self,
        caller: &Address,
        executor: Address,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.swap_executors.insert(executor);
        Ok(())
    }

    pub fn remove_swap_executor(
        &mut self,
        caller: &Address,
        executor: &Address,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.swap_executors.remove(executor);
        Ok(())
    }
}
