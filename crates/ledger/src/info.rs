//! Read-only account summary: balance, inventory and transfer history.

use serde::{Deserialize, Serialize};

use coinshop_core::{AccountId, Coins};

use crate::account::{Account, InventoryEntry, TransferRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub item_name: String,
    pub quantity: u32,
}

/// One history entry as seen from the viewing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLine {
    pub counterparty: AccountId,
    pub amount: Coins,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHistory {
    /// Most recent first.
    pub received: Vec<HistoryLine>,
    /// Most recent first.
    pub sent: Vec<HistoryLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub balance: Coins,
    pub inventory: Vec<InventoryLine>,
    pub history: TransferHistory,
}

impl AccountInfo {
    /// Build the summary for `account`.
    ///
    /// Records not involving the account are ignored; history is re-sorted
    /// most-recent-first (ties broken by the time-ordered transfer id) so the
    /// result does not depend on the order a store returned rows in.
    pub fn project(
        account: &Account,
        inventory: Vec<InventoryEntry>,
        received: Vec<TransferRecord>,
        sent: Vec<TransferRecord>,
    ) -> Self {
        let inventory = inventory
            .into_iter()
            .filter(|e| e.account_id == account.id)
            .map(|e| InventoryLine {
                item_name: e.item_name,
                quantity: e.quantity,
            })
            .collect();

        let received = history(received, |t| (t.to == account.id).then_some(t.from));
        let sent = history(sent, |t| (t.from == account.id).then_some(t.to));

        Self {
            balance: account.balance,
            inventory,
            history: TransferHistory { received, sent },
        }
    }
}

fn history(
    mut records: Vec<TransferRecord>,
    counterparty: impl Fn(&TransferRecord) -> Option<AccountId>,
) -> Vec<HistoryLine> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    records
        .iter()
        .filter_map(|t| {
            counterparty(t).map(|other| HistoryLine {
                counterparty: other,
                amount: t.amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use coinshop_core::{CredentialHash, Username};

    fn account(name: &str) -> Account {
        Account::open(Username::parse(name).unwrap(), CredentialHash::new("h"), Utc::now())
    }

    #[test]
    fn fresh_account_has_empty_projection() {
        let alice = account("alice");
        let info = AccountInfo::project(&alice, vec![], vec![], vec![]);
        assert_eq!(info.balance.get(), 1000);
        assert!(info.inventory.is_empty());
        assert_eq!(info.history, TransferHistory::default());
    }

    #[test]
    fn history_is_most_recent_first_with_counterparties() {
        let alice = account("alice");
        let bob = account("bob");
        let carol = account("carol");
        let t0 = Utc::now();

        let older = TransferRecord::new(bob.id, alice.id, Coins::from_const(5), t0);
        let later = t0 + Duration::seconds(1);
        let newer = TransferRecord::new(carol.id, alice.id, Coins::from_const(7), later);
        let sent = TransferRecord::new(alice.id, bob.id, Coins::from_const(3), t0);

        let info = AccountInfo::project(&alice, vec![], vec![older, newer], vec![sent]);

        assert_eq!(
            info.history.received,
            vec![
                HistoryLine { counterparty: carol.id, amount: Coins::from_const(7) },
                HistoryLine { counterparty: bob.id, amount: Coins::from_const(5) },
            ]
        );
        assert_eq!(
            info.history.sent,
            vec![HistoryLine { counterparty: bob.id, amount: Coins::from_const(3) }]
        );
    }

    #[test]
    fn foreign_records_are_ignored() {
        let alice = account("alice");
        let bob = account("bob");
        let unrelated = TransferRecord::new(bob.id, bob.id, Coins::from_const(1), Utc::now());
        let foreign_item = InventoryEntry::first_unit(bob.id, "cup", Utc::now());

        let info = AccountInfo::project(
            &alice,
            vec![foreign_item],
            vec![unrelated.clone()],
            vec![unrelated],
        );
        assert!(info.inventory.is_empty());
        assert!(info.history.received.is_empty());
        assert!(info.history.sent.is_empty());
    }
}
