//! `coinshop-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it validates
//! login input, hashes and verifies passwords, and issues/validates signed
//! session tokens. Looking accounts up is the caller's job.

pub mod claims;
pub mod credentials;
pub mod error;
pub mod password;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use credentials::LoginCredentials;
pub use error::AuthError;
pub use password::{BcryptHasher, PasswordError, PasswordHasher};
pub use token::{Hs256SessionTokens, JwtValidator, SessionToken, TokenError};
