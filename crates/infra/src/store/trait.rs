use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use coinshop_core::{AccountId, Coins, Username};
use coinshop_ledger::{Account, BalanceError, InventoryEntry, TransferRecord};

/// Identity/ledger store operation error.
///
/// `Balance` means the mutation was refused by the balance rule and nothing
/// was written. `CreditFailed` means the receiving leg of a transfer could not
/// be applied; stores roll the debit back, but callers must still treat it as
/// a ledger inconsistency.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error("transfer endpoints must differ (account {0})")]
    SameAccount(AccountId),

    #[error("credit of {amount} to account {account} failed: {reason}")]
    CreditFailed {
        account: AccountId,
        amount: Coins,
        reason: String,
    },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// The identity + ledger store.
///
/// This is the only path that writes balances. Implementations must:
/// - run every balance read-check-write under a per-account exclusive lock,
///   computing the new value with [`coinshop_ledger::apply_delta`]
/// - acquire the locks of a transfer in ascending [`AccountId`] order
/// - commit a transfer's debit, credit and record together, or none of them
/// - commit a purchase's debit and inventory upsert together, or neither
/// - return history most-recent-first
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a freshly opened account. The username check and the insert are atomic.
    async fn create_account(&self, account: Account) -> Result<Account, StoreError>;

    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Apply a signed delta and return the new balance.
    async fn adjust_balance(&self, id: AccountId, delta: i64) -> Result<Coins, StoreError>;

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<TransferRecord, StoreError>;

    /// Debit `price` and add one unit of `item_name` to the account's inventory.
    async fn purchase(
        &self,
        id: AccountId,
        item_name: &str,
        price: Coins,
    ) -> Result<InventoryEntry, StoreError>;

    async fn inventory(&self, id: AccountId) -> Result<Vec<InventoryEntry>, StoreError>;

    async fn received_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError>;

    async fn sent_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        (**self).create_account(account).await
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn adjust_balance(&self, id: AccountId, delta: i64) -> Result<Coins, StoreError> {
        (**self).adjust_balance(id, delta).await
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<TransferRecord, StoreError> {
        (**self).transfer(from, to, amount).await
    }

    async fn purchase(
        &self,
        id: AccountId,
        item_name: &str,
        price: Coins,
    ) -> Result<InventoryEntry, StoreError> {
        (**self).purchase(id, item_name, price).await
    }

    async fn inventory(&self, id: AccountId) -> Result<Vec<InventoryEntry>, StoreError> {
        (**self).inventory(id).await
    }

    async fn received_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError> {
        (**self).received_transfers(id).await
    }

    async fn sent_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError> {
        (**self).sent_transfers(id).await
    }
}
