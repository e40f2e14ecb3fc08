use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use coinshop_core::{AccountId, Coins, Username};
use coinshop_ledger::{Account, InventoryEntry, TransferRecord, apply_delta, credit, debit};

use super::r#trait::{AccountStore, StoreError};

type AccountSlot = Arc<Mutex<Account>>;

#[derive(Debug, Default)]
struct Directory {
    by_id: HashMap<AccountId, AccountSlot>,
    by_username: HashMap<Username, AccountId>,
}

/// In-memory identity/ledger store.
///
/// Each account sits behind its own mutex; the directory lock is only held
/// long enough to clone the slot handle. Intended for tests/dev and for
/// running the service without a database.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    directory: RwLock<Directory>,
    /// Append-only; newest record last.
    transfers: RwLock<Vec<TransferRecord>>,
    inventory: RwLock<HashMap<(AccountId, String), InventoryEntry>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: AccountId) -> Result<AccountSlot, StoreError> {
        let directory = self.directory.read().map_err(|_| poisoned("directory"))?;
        directory
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::AccountNotFound(id))
    }

    fn history(
        &self,
        matches: impl Fn(&TransferRecord) -> bool,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let transfers = self.transfers.read().map_err(|_| poisoned("transfers"))?;
        Ok(transfers.iter().rev().filter(|t| matches(t)).cloned().collect())
    }
}

fn poisoned(what: &str) -> StoreError {
    StoreError::Backend(format!("{what} lock poisoned"))
}

fn lock(slot: &AccountSlot) -> Result<MutexGuard<'_, Account>, StoreError> {
    slot.lock().map_err(|_| poisoned("account"))
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        let mut directory = self.directory.write().map_err(|_| poisoned("directory"))?;
        if directory.by_username.contains_key(&account.username) {
            return Err(StoreError::UsernameTaken(account.username.as_str().to_owned()));
        }
        directory.by_username.insert(account.username.clone(), account.id);
        directory
            .by_id
            .insert(account.id, Arc::new(Mutex::new(account.clone())));
        Ok(account)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError> {
        let id = {
            let directory = self.directory.read().map_err(|_| poisoned("directory"))?;
            directory.by_username.get(username).copied()
        };
        match id {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        match self.slot(id) {
            Ok(slot) => Ok(Some(lock(&slot)?.clone())),
            Err(StoreError::AccountNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn adjust_balance(&self, id: AccountId, delta: i64) -> Result<Coins, StoreError> {
        let slot = self.slot(id)?;
        let mut account = lock(&slot)?;
        let next = apply_delta(account.balance, delta)?;
        account.balance = next;
        Ok(next)
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<TransferRecord, StoreError> {
        if from == to {
            return Err(StoreError::SameAccount(from));
        }
        let sender_slot = self.slot(from)?;
        let receiver_slot = self.slot(to)?;

        // Ascending id order on both sides of every transfer.
        let (mut sender, mut receiver) = if from < to {
            let s = lock(&sender_slot)?;
            let r = lock(&receiver_slot)?;
            (s, r)
        } else {
            let r = lock(&receiver_slot)?;
            let s = lock(&sender_slot)?;
            (s, r)
        };

        let debited = debit(sender.balance, amount)?;
        let credited = credit(receiver.balance, amount).map_err(|e| StoreError::CreditFailed {
            account: to,
            amount,
            reason: e.to_string(),
        })?;

        let record = TransferRecord::new(from, to, amount, Utc::now());
        let mut transfers = self.transfers.write().map_err(|_| poisoned("transfers"))?;
        sender.balance = debited;
        receiver.balance = credited;
        transfers.push(record.clone());
        Ok(record)
    }

    async fn purchase(
        &self,
        id: AccountId,
        item_name: &str,
        price: Coins,
    ) -> Result<InventoryEntry, StoreError> {
        let slot = self.slot(id)?;
        let mut account = lock(&slot)?;
        let next = debit(account.balance, price)?;

        let mut inventory = self.inventory.write().map_err(|_| poisoned("inventory"))?;
        let entry = inventory
            .entry((id, item_name.to_owned()))
            .and_modify(|e| e.quantity = e.quantity.saturating_add(1))
            .or_insert_with(|| InventoryEntry::first_unit(id, item_name, Utc::now()))
            .clone();
        account.balance = next;
        Ok(entry)
    }

    async fn inventory(&self, id: AccountId) -> Result<Vec<InventoryEntry>, StoreError> {
        let inventory = self.inventory.read().map_err(|_| poisoned("inventory"))?;
        let mut entries: Vec<_> = inventory
            .values()
            .filter(|e| e.account_id == id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(entries)
    }

    async fn received_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError> {
        self.history(|t| t.to == id)
    }

    async fn sent_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError> {
        self.history(|t| t.from == id)
    }
}
