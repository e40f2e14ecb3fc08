//! Salted, deliberately slow password hashing.

use thiserror::Error;

use coinshop_core::CredentialHash;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("hash cost {0} is outside the supported range 4..=31")]
    InvalidCost(u32),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// One-way credential hashing.
///
/// Implementations must salt every hash and compare in constant time. Both
/// operations are CPU-bound and should run off the async executor.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<CredentialHash, PasswordError>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    fn verify(&self, password: &str, hash: &CredentialHash) -> Result<bool, PasswordError>;
}

/// bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Default work factor: tens of milliseconds per hash on current hardware.
    pub const DEFAULT_COST: u32 = 10;

    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(4..=31).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
        }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<CredentialHash, PasswordError> {
        bcrypt::hash(password, self.cost)
            .map(CredentialHash::new)
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &CredentialHash) -> Result<bool, PasswordError> {
        bcrypt::verify(password, hash.as_str()).map_err(|e| PasswordError::Hashing(e.to_string()))
    }
}
