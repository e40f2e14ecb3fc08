//! Opaque credential hashes.

use serde::{Deserialize, Serialize};

/// A stored, one-way credential hash (e.g. a bcrypt string).
///
/// Opaque to everything except the hasher that produced it. `Debug` never
/// prints the hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}
