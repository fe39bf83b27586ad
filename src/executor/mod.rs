//! Trade execution abstraction.
//!
//! The engine approves the aggregate input to a proxy, hands the call data
//! to an operator-supplied executor, and measures what actually arrived as
//! a custody balance delta. The executor's word is never trusted.

use crate::domain::{Amount, Token};
use std::fmt;

pub mod fixed;

pub use fixed::FixedPriceExecutor;

pub trait TradeExecutor: Send + Sync + fmt::Debug {
    /// Execute a trade of `input` of `from` into `to`. `exec_data` is an
    /// opaque operator-supplied payload.
    fn execute(
        &self,
        from: &Token,
        to: &Token,
        input: Amount,
        exec_data: &serde_json::Value,
    ) -> Result<(), ExecutorError>;
}

/// Error type for trade execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorError(pub String);

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ExecutorError {}
