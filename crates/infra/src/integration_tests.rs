//! Integration tests for the full login → ledger pipeline.
//!
//! Tests: AuthService → AccountStore ← LedgerService
//!
//! Verifies:
//! - End-to-end shop scenarios produce the expected balances and history
//! - Balances never go negative under concurrent debits
//! - Opposing concurrent transfers neither deadlock nor lose coins

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use coinshop_auth::{BcryptHasher, Hs256SessionTokens};
    use coinshop_core::{AccountId, Coins};
    use coinshop_ledger::{HistoryLine, InventoryLine, LedgerError};

    use crate::auth_service::{AuthService, SessionVerifier};
    use crate::ledger_service::LedgerService;
    use crate::store::InMemoryAccountStore;

    type Store = Arc<InMemoryAccountStore>;

    struct Shop {
        auth: AuthService<Store>,
        ledger: LedgerService<Store>,
    }

    impl Shop {
        fn new() -> Self {
            let store: Store = Arc::new(InMemoryAccountStore::new());
            Self {
                auth: AuthService::new(
                    store.clone(),
                    Arc::new(BcryptHasher::new(4).unwrap()),
                    Hs256SessionTokens::new(b"integration-secret", Duration::hours(1)),
                ),
                ledger: LedgerService::new(store),
            }
        }

        async fn login(&self, name: &str) -> AccountId {
            let token = self.auth.authenticate(name, "password").await.unwrap();
            self.auth.verify(token.as_str()).unwrap().sub
        }

        async fn balance(&self, id: AccountId) -> i64 {
            self.ledger.info(id).await.unwrap().balance.get()
        }
    }

    #[tokio::test]
    async fn new_account_starts_with_bonus_and_nothing_else() {
        let shop = Shop::new();
        let alice = shop.login("alice").await;

        let info = shop.ledger.info(alice).await.unwrap();
        assert_eq!(info.balance, Coins::from_const(1000));
        assert!(info.inventory.is_empty());
        assert!(info.history.received.is_empty());
        assert!(info.history.sent.is_empty());
    }

    #[tokio::test]
    async fn buying_a_t_shirt_costs_eighty() {
        let shop = Shop::new();
        let alice = shop.login("alice").await;

        shop.ledger.purchase(alice, "t-shirt").await.unwrap();

        let info = shop.ledger.info(alice).await.unwrap();
        assert_eq!(info.balance.get(), 920);
        assert_eq!(
            info.inventory,
            vec![InventoryLine { item_name: "t-shirt".into(), quantity: 1 }]
        );
    }

    #[tokio::test]
    async fn transfer_shows_up_on_both_sides() {
        let shop = Shop::new();
        let alice = shop.login("alice").await;
        let bob = shop.login("bob").await;

        shop.ledger.transfer(alice, "bob", 100).await.unwrap();

        let alice_info = shop.ledger.info(alice).await.unwrap();
        let bob_info = shop.ledger.info(bob).await.unwrap();
        assert_eq!(alice_info.balance.get(), 900);
        assert_eq!(bob_info.balance.get(), 1100);
        assert_eq!(
            alice_info.history.sent,
            vec![HistoryLine { counterparty: bob, amount: Coins::from_const(100) }]
        );
        assert_eq!(
            bob_info.history.received,
            vec![HistoryLine { counterparty: alice, amount: Coins::from_const(100) }]
        );
    }

    #[tokio::test]
    async fn overdraft_after_purchase_is_refused_without_side_effects() {
        let shop = Shop::new();
        let alice = shop.login("alice").await;
        shop.login("bob").await;
        shop.ledger.purchase(alice, "t-shirt").await.unwrap();

        let err = shop.ledger.transfer(alice, "bob", 950).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds { balance: Coins::from_const(920), requested: 950 }
        );
        let info = shop.ledger.info(alice).await.unwrap();
        assert_eq!(info.balance.get(), 920);
        assert!(info.history.sent.is_empty());
    }

    #[tokio::test]
    async fn unknown_item_and_recipient_leave_balance_alone() {
        let shop = Shop::new();
        let alice = shop.login("alice").await;

        assert!(matches!(
            shop.ledger.purchase(alice, "car").await,
            Err(LedgerError::UnknownItem(_))
        ));
        assert!(matches!(
            shop.ledger.transfer(alice, "nobody", 10).await,
            Err(LedgerError::RecipientNotFound(_))
        ));
        assert_eq!(shop.balance(alice).await, 1000);
    }

    #[tokio::test]
    async fn repeated_purchases_accumulate_quantity() {
        let shop = Shop::new();
        let alice = shop.login("alice").await;
        shop.ledger.purchase(alice, "cup").await.unwrap();
        shop.ledger.purchase(alice, "cup").await.unwrap();
        shop.ledger.purchase(alice, "pen").await.unwrap();

        let info = shop.ledger.info(alice).await.unwrap();
        assert_eq!(info.balance.get(), 1000 - 20 - 20 - 10);
        assert_eq!(
            info.inventory,
            vec![
                InventoryLine { item_name: "cup".into(), quantity: 2 },
                InventoryLine { item_name: "pen".into(), quantity: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn fifteen_t_shirt_attempts_buy_exactly_twelve() {
        let shop = Shop::new();
        let alice = shop.login("alice").await;

        let mut bought = 0;
        for _ in 0..15 {
            match shop.ledger.purchase(alice, "t-shirt").await {
                Ok(_) => bought += 1,
                Err(LedgerError::InsufficientFunds { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(bought, 12);
        let info = shop.ledger.info(alice).await.unwrap();
        assert_eq!(info.balance.get(), 40);
        assert_eq!(info.inventory[0].quantity, 12);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_debits_never_overdraw() {
        let shop = Arc::new(Shop::new());
        let alice = shop.login("alice").await;
        let bob = shop.login("bob").await;

        // 1000 / 75 = 13 transfers can succeed.
        let mut handles = Vec::new();
        for _ in 0..40 {
            let shop = Arc::clone(&shop);
            handles.push(tokio::spawn(async move { shop.ledger.transfer(alice, "bob", 75).await }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(LedgerError::InsufficientFunds { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(ok, 13);
        assert_eq!(shop.balance(alice).await, 1000 - 13 * 75);
        assert_eq!(shop.balance(bob).await, 1000 + 13 * 75);
        assert_eq!(shop.ledger.info(alice).await.unwrap().history.sent.len(), 13);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn opposing_transfers_conserve_coins() {
        let shop = Arc::new(Shop::new());
        let alice = shop.login("alice").await;
        let bob = shop.login("bob").await;

        let mut handles = Vec::new();
        for i in 0..200 {
            let shop = Arc::clone(&shop);
            let (from, to) = if i % 2 == 0 { (alice, "bob") } else { (bob, "alice") };
            handles.push(tokio::spawn(async move { shop.ledger.transfer(from, to, 7).await }));
        }
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Ok(_) | Err(LedgerError::InsufficientFunds { .. })));
        }

        let total = shop.balance(alice).await + shop.balance(bob).await;
        assert_eq!(total, 2000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_purchases_respect_balance() {
        let shop = Arc::new(Shop::new());
        let alice = shop.login("alice").await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let shop = Arc::clone(&shop);
            handles.push(tokio::spawn(async move { shop.ledger.purchase(alice, "hoody").await }));
        }
        let bought = {
            let mut n = 0;
            for handle in handles {
                if handle.await.unwrap().is_ok() {
                    n += 1;
                }
            }
            n
        };

        assert_eq!(bought, 3);
        let info = shop.ledger.info(alice).await.unwrap();
        assert_eq!(info.balance.get(), 100);
        assert_eq!(info.inventory[0].quantity, 3);
    }
}
