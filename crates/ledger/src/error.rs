use thiserror::Error;

use coinshop_core::{AccountId, Coins};

use crate::balance::BalanceError;

/// Ledger operation failure.
///
/// Every variant except [`LedgerError::Inconsistent`] and
/// [`LedgerError::Storage`] is an ordinary business outcome and guarantees that
/// nothing was mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("recipient '{0}' not found")]
    RecipientNotFound(String),

    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Coins, requested: u64 },

    /// The credit leg of a transfer failed after the debit was applied.
    #[error("ledger inconsistency: {0}")]
    Inconsistent(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Errors operators must be alerted on (possible ledger drift).
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::Inconsistent(_))
    }
}

impl From<BalanceError> for LedgerError {
    fn from(value: BalanceError) -> Self {
        match value {
            BalanceError::InsufficientFunds { balance, requested } => {
                LedgerError::InsufficientFunds { balance, requested }
            }
            BalanceError::Overflow => {
                LedgerError::InvalidInput("operation would overflow the balance".to_owned())
            }
        }
    }
}
