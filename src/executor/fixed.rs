//! Fixed-price trade executor over the in-memory ledger.

use super::{ExecutorError, TradeExecutor};
use crate::custody::LedgerCustody;
use crate::domain::{Address, Amount, Token};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Executes trades against the ledger custody at a fixed price ratio:
/// `delivered = input * price_num / price_den`. Individual deliveries can
/// be overridden ahead of time, and the executor can be set to fail, so
/// tests can drive every registration path.
#[derive(Debug)]
pub struct FixedPriceExecutor {
    custody: Arc<LedgerCustody>,
    proxy: Address,
    price_num: u64,
    price_den: u64,
    overrides: Mutex<VecDeque<Amount>>,
    failing: Mutex<bool>,
}

impl FixedPriceExecutor {
    pub fn new(custody: Arc<LedgerCustody>, proxy: Address, price_num: u64, price_den: u64) -> Self {
        FixedPriceExecutor {
            custody,
            proxy,
            price_num,
            price_den,
            overrides: Mutex::new(VecDeque::new()),
            failing: Mutex::new(false),
        }
    }

    /// Queue a fixed delivery for the next execution, bypassing the price.
    pub fn push_delivery(&self, amount: Amount) {
        self.lock(&self.overrides).push_back(amount);
    }

    /// Make subsequent executions fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.lock(&self.failing) = failing;
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TradeExecutor for FixedPriceExecutor {
    fn execute(
        &self,
        from: &Token,
        to: &Token,
        input: Amount,
        _exec_data: &serde_json::Value,
    ) -> Result<(), ExecutorError> {
        if *self.lock(&self.failing) {
            return Err(ExecutorError("executor rejected the trade".into()));
        }

        // Take the input through the approved allowance, like an on-venue
        // proxy would.
        self.custody
            .spend_allowance(from, &self.proxy, input)
            .map_err(|e| ExecutorError(e.to_string()))?;

        let delivered = self.lock(&self.overrides).pop_front().unwrap_or_else(|| {
            input.times(self.price_num) / Amount::from(self.price_den)
        });
        self.custody
            .mint(to, self.custody.pool_address(), delivered);
        Ok(())
    }
}
