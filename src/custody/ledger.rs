//! In-memory ledger custody, used by the standalone binary and tests.

use super::{Custody, CustodyError};
use crate::domain::{Address, Amount, Token};
use std::collections::HashMap;
use std::sync::Mutex;

/// Balances and allowances kept in process memory. The pool account is the
/// engine's custody address; `pull` credits it, `pay` debits it.
#[derive(Debug)]
pub struct LedgerCustody {
    pool: Address,
    balances: Mutex<HashMap<(Token, Address), Amount>>,
    allowances: Mutex<HashMap<(Token, Address), Amount>>,
}

impl LedgerCustody {
    pub fn new(pool: Address) -> Self {
        LedgerCustody {
            pool,
            balances: Mutex::new(HashMap::new()),
            allowances: Mutex::new(HashMap::new()),
        }
    }

    /// The engine pool account this ledger was built around.
    pub fn pool_address(&self) -> &Address {
        &self.pool
    }

    /// Credit `holder` with `amount` of `token` out of thin air. Funding
    /// hook for tests and the standalone binary.
    pub fn mint(&self, token: &Token, holder: &Address, amount: Amount) {
        let mut balances = self.lock_balances();
        let entry = balances
            .entry((token.clone(), holder.clone()))
            .or_insert(Amount::ZERO);
        *entry += amount;
    }

    /// Consume a previously granted allowance: debits the pool's balance
    /// and the spender's allowance. Used by trade executors taking their
    /// input.
    pub fn spend_allowance(
        &self,
        token: &Token,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        {
            let mut allowances = self.lock_allowances();
            let key = (token.clone(), spender.clone());
            let available = allowances.get(&key).copied().unwrap_or(Amount::ZERO);
            let left = available.checked_sub(amount).ok_or_else(|| {
                CustodyError::InsufficientAllowance {
                    token: token.clone(),
                    spender: spender.clone(),
                    requested: amount,
                    available,
                }
            })?;
            allowances.insert(key, left);
        }
        let pool = self.pool.clone();
        self.debit(token, &pool, amount)
    }

    /// Remaining allowance granted to `spender` for `token`.
    pub fn allowance(&self, token: &Token, spender: &Address) -> Amount {
        self.lock_allowances()
            .get(&(token.clone(), spender.clone()))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn debit(&self, token: &Token, holder: &Address, amount: Amount) -> Result<(), CustodyError> {
        let mut balances = self.lock_balances();
        let key = (token.clone(), holder.clone());
        let available = balances.get(&key).copied().unwrap_or(Amount::ZERO);
        let left =
            available
                .checked_sub(amount)
                .ok_or_else(|| CustodyError::InsufficientBalance {
                    token: token.clone(),
                    holder: holder.clone(),
                    requested: amount,
                    available,
                })?;
        balances.insert(key, left);
        Ok(())
    }

    fn credit(&self, token: &Token, holder: &Address, amount: Amount) {
        self.mint(token, holder, amount);
    }

    fn lock_balances(&self) -> std::sync::MutexGuard<'_, HashMap<(Token, Address), Amount>> {
        self.balances.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_allowances(&self) -> std::sync::MutexGuard<'_, HashMap<(Token, Address), Amount>> {
        self.allowances.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Custody for LedgerCustody {
    fn pull(&self, token: &Token, payer: &Address, amount: Amount) -> Result<(), CustodyError> {
        self.debit(token, payer, amount)?;
        let pool = self.pool.clone();
        self.credit(token, &pool, amount);
        Ok(())
    }

    fn pay(&self, token: &Token, recipient: &Address, amount: Amount) -> Result<(), CustodyError> {
        let pool = self.pool.clone();
        self.debit(token, &pool, amount)?;
        self.credit(token, recipient, amount);
        Ok(())
    }

    fn balance_of(&self, token: &Token, holder: &Address) -> Amount {
        self.lock_balances()
            .get(&(token.clone(), holder.clone()))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn approve(
        &self,
        token: &Token,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.lock_allowances()
            .insert((token.clone(), spender.clone()), amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(fill: char) -> Token {
        Token::new(Address::new(format!("0x{}", fill.to_string().repeat(40))))
    }

    fn addr(fill: char) -> Address {
        Address::new(format!("0x{}", fill.to_string().repeat(40)))
    }

    #[test]
    fn test_pull_moves_payer_to_pool() {
        let custody = LedgerCustody::new(addr('e'));
        custody.mint(&token('a'), &addr('1'), Amount::from(1_000u64));

        custody
            .pull(&token('a'), &addr('1'), Amount::from(400u64))
            .unwrap();

        assert_eq!(
            custody.balance_of(&token('a'), &addr('1')),
            Amount::from(600u64)
        );
        assert_eq!(
            custody.balance_of(&token('a'), &addr('e')),
            Amount::from(400u64)
        );
    }

    #[test]
    fn test_pull_fails_on_insufficient_balance() {
        let custody = LedgerCustody::new(addr('e'));
        let err = custody
            .pull(&token('a'), &addr('1'), Amount::from(1u64))
            .unwrap_err();
        assert!(matches!(err, CustodyError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_pay_moves_pool_to_recipient() {
        let custody = LedgerCustody::new(addr('e'));
        custody.mint(&token('b'), &addr('e'), Amount::from(50u64));

        custody
            .pay(&token('b'), &addr('2'), Amount::from(30u64))
            .unwrap();

        assert_eq!(
            custody.balance_of(&token('b'), &addr('2')),
            Amount::from(30u64)
        );
        assert_eq!(
            custody.balance_of(&token('b'), &addr('e')),
            Amount::from(20u64)
        );
    }

    #[test]
    fn test_spend_allowance_requires_grant() {
        let custody = LedgerCustody::new(addr('e'));
        custody.mint(&token('a'), &addr('e'), Amount::from(100u64));

        let err = custody
            .spend_allowance(&token('a'), &addr('p'), Amount::from(10u64))
            .unwrap_err();
        assert!(matches!(err, CustodyError::InsufficientAllowance { .. }));

        custody
            .approve(&token('a'), &addr('p'), Amount::from(60u64))
            .unwrap();
        custody
            .spend_allowance(&token('a'), &addr('p'), Amount::from(10u64))
            .unwrap();
        assert_eq!(custody.allowance(&token('a'), &addr('p')), Amount::from(50u64));
        assert_eq!(
            custody.balance_of(&token('a'), &addr('e')),
            Amount::from(90u64)
        );
    }
}
