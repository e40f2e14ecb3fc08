//! The balance mutation rule.
//!
//! Every store computes a new balance through [`apply_delta`] while holding
//! that account's lock, so the never-negative invariant has exactly one
//! implementation.

use thiserror::Error;

use coinshop_core::Coins;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Coins, requested: u64 },

    #[error("balance would overflow")]
    Overflow,
}

/// Compute `balance + delta`, refusing any result below zero.
///
/// `delta` may be negative (debit) or positive (credit). No state is touched;
/// callers persist the returned value only on `Ok`.
pub fn apply_delta(balance: Coins, delta: i64) -> Result<Coins, BalanceError> {
    let next = balance.get().checked_add(delta).ok_or(BalanceError::Overflow)?;
    if next < 0 {
        return Err(BalanceError::InsufficientFunds {
            balance,
            requested: delta.unsigned_abs(),
        });
    }
    Coins::new(next).map_err(|_| BalanceError::Overflow)
}

pub fn debit(balance: Coins, amount: Coins) -> Result<Coins, BalanceError> {
    apply_delta(balance, -amount.get())
}

pub fn credit(balance: Coins, amount: Coins) -> Result<Coins, BalanceError> {
    apply_delta(balance, amount.get())
}
