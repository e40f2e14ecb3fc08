//! Infrastructure layer: account stores (in-memory, Postgres) and the
//! services that drive them.

pub mod auth_service;
pub mod ledger_service;
pub mod store;

mod integration_tests;

pub use auth_service::{AuthService, SessionVerifier};
pub use ledger_service::LedgerService;
pub use store::{AccountStore, InMemoryAccountStore, PostgresAccountStore, StoreError};
