//! Token custody abstraction.
//!
//! The engine pools all balances in a single custody account and computes
//! per-position entitlements arithmetically; custody is trusted to move
//! tokens and is never consulted for accounting truth.

use crate::domain::{Address, Amount, Token};
use std::fmt;

pub mod ledger;

pub use ledger::LedgerCustody;

/// Custody collaborator: pulls deposits into the pool, pays withdrawals
/// out of it, reports balances, and grants one-shot trade allowances.
///
/// Entry points into the engine are serialized, so the surface is
/// synchronous.
pub trait Custody: Send + Sync + fmt::Debug {
    /// Pull `amount` of `token` from `payer` into the engine pool.
    fn pull(&self, token: &Token, payer: &Address, amount: Amount) -> Result<(), CustodyError>;

    /// Pay `amount` of `token` from the engine pool to `recipient`.
    fn pay(&self, token: &Token, recipient: &Address, amount: Amount) -> Result<(), CustodyError>;

    /// Current balance of `holder` in `token`.
    fn balance_of(&self, token: &Token, holder: &Address) -> Amount;

    /// Approve `spender` to take up to `amount` of `token` from the pool.
    fn approve(&self, token: &Token, spender: &Address, amount: Amount)
        -> Result<(), CustodyError>;
}

/// Error type for custody operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The payer or pool balance cannot cover the transfer.
    InsufficientBalance {
        token: Token,
        holder: Address,
        requested: Amount,
        available: Amount,
    },
    /// The spender's allowance cannot cover the transfer.
    InsufficientAllowance {
        token: Token,
        spender: Address,
        requested: Amount,
        available: Amount,
    },
}

impl fmt::Display for CustodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustodyError::InsufficientBalance {
                token,
                holder,
                requested,
                available,
            } => write!(
                f,
                "insufficient balance of {} for {}: requested {}, available {}",
                token, holder, requested, available
            ),
            CustodyError::InsufficientAllowance {
                token,
                spender,
                requested,
                available,
            } => write!(
                f,
                "insufficient allowance of {} for {}: requested {}, available {}",
                token, spender, requested, available
            ),
        }
    }
}

impl std::error::Error for CustodyError {}
