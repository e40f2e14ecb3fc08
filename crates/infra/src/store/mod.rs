//! Identity + ledger persistence boundary.
//!
//! Services talk to [`AccountStore`]; the binary picks the backend at
//! startup (Postgres when a database URL is configured, in-memory otherwise).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
pub use r#trait::{AccountStore, StoreError};
