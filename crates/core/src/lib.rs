//! `coinshop-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod coins;
pub mod credential;
pub mod error;
pub mod id;
pub mod username;
pub mod value_object;

pub use coins::Coins;
pub use credential::CredentialHash;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, TransferId};
pub use username::Username;
pub use value_object::ValueObject;
