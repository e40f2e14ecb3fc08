//! Balance-mutating use cases: transfer, purchase, info.
//!
//! The service validates input and resolves names; every write goes through
//! [`AccountStore`], which owns the locking and atomicity guarantees.

use tracing::{error, info, instrument, warn};

use coinshop_core::{AccountId, Coins, Username};
use coinshop_ledger::{AccountInfo, InventoryEntry, LedgerError, PriceCatalog, TransferRecord};

use crate::store::{AccountStore, StoreError};

#[derive(Debug, Clone)]
pub struct LedgerService<S> {
    store: S,
    catalog: &'static PriceCatalog,
}

impl<S: AccountStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            catalog: PriceCatalog::standard(),
        }
    }

    /// Apply a signed delta to one account's balance.
    ///
    /// A result below zero fails with `InsufficientFunds` and leaves the
    /// balance unchanged.
    #[instrument(skip(self), fields(account_id = %account))]
    pub async fn adjust_balance(
        &self,
        account: AccountId,
        delta: i64,
    ) -> Result<Coins, LedgerError> {
        self.store
            .adjust_balance(account, delta)
            .await
            .map_err(into_ledger_error)
    }

    /// Move `amount` coins from `sender` to the account named `recipient`.
    #[instrument(skip(self), fields(sender = %sender))]
    pub async fn transfer(
        &self,
        sender: AccountId,
        recipient: &str,
        amount: i64,
    ) -> Result<TransferRecord, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidInput("amount must be a positive integer".to_owned()));
        }
        let amount = Coins::new(amount).map_err(|e| LedgerError::InvalidInput(e.to_string()))?;
        let recipient_name = Username::parse(recipient)
            .map_err(|e| LedgerError::InvalidInput(format!("recipient: {e}")))?;

        let receiver = self
            .store
            .find_by_username(&recipient_name)
            .await
            .map_err(into_ledger_error)?
            .ok_or_else(|| LedgerError::RecipientNotFound(recipient_name.as_str().to_owned()))?;

        if receiver.id == sender {
            return Err(LedgerError::InvalidInput("cannot send coins to yourself".to_owned()));
        }

        let record = self
            .store
            .transfer(sender, receiver.id, amount)
            .await
            .map_err(into_ledger_error)?;

        info!(
            transfer_id = %record.id,
            receiver = %record.to,
            amount = %record.amount,
            "coins transferred"
        );
        Ok(record)
    }

    /// Buy one unit of `item_name` at its catalog price.
    #[instrument(skip(self), fields(account_id = %account))]
    pub async fn purchase(
        &self,
        account: AccountId,
        item_name: &str,
    ) -> Result<InventoryEntry, LedgerError> {
        let price = self
            .catalog
            .price_of(item_name)
            .ok_or_else(|| LedgerError::UnknownItem(item_name.to_owned()))?;

        let entry = self
            .store
            .purchase(account, item_name, price)
            .await
            .map_err(into_ledger_error)?;

        info!(item = item_name, %price, quantity = entry.quantity, "item purchased");
        Ok(entry)
    }

    /// Balance, inventory and transfer history for one account.
    #[instrument(skip(self), fields(account_id = %account))]
    pub async fn info(&self, account: AccountId) -> Result<AccountInfo, LedgerError> {
        let snapshot = self
            .store
            .find_by_id(account)
            .await
            .map_err(into_ledger_error)?
            .ok_or(LedgerError::AccountNotFound(account))?;

        let inventory = self.store.inventory(account).await.map_err(into_ledger_error)?;
        let received = self
            .store
            .received_transfers(account)
            .await
            .map_err(into_ledger_error)?;
        let sent = self.store.sent_transfers(account).await.map_err(into_ledger_error)?;

        Ok(AccountInfo::project(&snapshot, inventory, received, sent))
    }
}

fn into_ledger_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::AccountNotFound(id) => LedgerError::AccountNotFound(id),
        StoreError::Balance(e) => e.into(),
        StoreError::SameAccount(_) => {
            LedgerError::InvalidInput("cannot send coins to yourself".to_owned())
        }
        StoreError::CreditFailed {
            account,
            amount,
            reason,
        } => {
            error!(
                ledger_inconsistency = true,
                receiver = %account,
                %amount,
                %reason,
                "transfer credit failed after debit"
            );
            LedgerError::Inconsistent(format!("credit of {amount} to {account} failed: {reason}"))
        }
        StoreError::UsernameTaken(name) => {
            warn!(username = %name, "unexpected username conflict in ledger operation");
            LedgerError::Storage(format!("username conflict: {name}"))
        }
        StoreError::Backend(msg) => LedgerError::Storage(msg),
    }
}
