//! Account usernames.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// A validated, immutable username.
///
/// ## Invariants
/// - surrounding whitespace is trimmed
/// - non-empty after trimming
/// - at most [`MAX_USERNAME_LEN`] characters
/// - no control characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("username must not be empty"));
        }
        if trimmed.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(DomainError::validation("username must not contain control characters"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Username {}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
