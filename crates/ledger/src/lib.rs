//! `coinshop-ledger` — the coin ledger domain.
//!
//! Pure rules and models: accounts, the never-negative balance rule, the
//! fixed price catalog, transfer/inventory records and the info projection.
//! Storage adapters and the services that drive them live in `coinshop-infra`.

pub mod account;
pub mod balance;
pub mod catalog;
pub mod error;
pub mod info;

pub use account::{Account, InventoryEntry, SIGNUP_BONUS, TransferRecord};
pub use balance::{BalanceError, apply_delta, credit, debit};
pub use catalog::PriceCatalog;
pub use error::LedgerError;
pub use info::{AccountInfo, HistoryLine, InventoryLine, TransferHistory};
