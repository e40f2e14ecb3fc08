use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coinshop_core::{AccountId, Coins, CredentialHash, TransferId, Username};

/// Balance every newly provisioned account starts with.
pub const SIGNUP_BONUS: Coins = Coins::from_const(1000);

/// A user's identity plus coin balance.
///
/// `balance` is only ever changed by the ledger (through [`crate::apply_delta`]);
/// accounts are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub credential_hash: CredentialHash,
    pub balance: Coins,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// A brand-new account credited with the signup bonus.
    pub fn open(username: Username, credential_hash: CredentialHash, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            username,
            credential_hash,
            balance: SIGNUP_BONUS,
            created_at: now,
        }
    }
}

/// Immutable, append-only record of one completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TransferId,
    pub from: AccountId,
    pub to: AccountId,
    /// Always strictly positive.
    pub amount: Coins,
    pub created_at: DateTime<Utc>,
}

impl TransferRecord {
    pub fn new(from: AccountId, to: AccountId, amount: Coins, now: DateTime<Utc>) -> Self {
        Self {
            id: TransferId::new(),
            from,
            to,
            amount,
            created_at: now,
        }
    }
}

/// Units of one catalog item owned by an account.
///
/// Keyed by `(account_id, item_name)`. Repeat purchases bump `quantity`; it
/// never goes down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub account_id: AccountId,
    pub item_name: String,
    pub quantity: u32,
    /// Time of the first purchase.
    pub created_at: DateTime<Utc>,
}

impl InventoryEntry {
    pub fn first_unit(
        account_id: AccountId,
        item_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            item_name: item_name.into(),
            quantity: 1,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opened_account_starts_with_signup_bonus() {
        let account = Account::open(
            Username::parse("alice").unwrap(),
            CredentialHash::new("h"),
            Utc::now(),
        );
        assert_eq!(account.balance.get(), 1000);
    }

    #[test]
    fn first_purchase_has_quantity_one() {
        let entry = InventoryEntry::first_unit(AccountId::new(), "cup", Utc::now());
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.item_name, "cup");
    }
}
