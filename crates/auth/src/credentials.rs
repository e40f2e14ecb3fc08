//! Login input validation.
//!
//! Handlers build [`LoginCredentials`] from raw request strings before any
//! account lookup happens.

use coinshop_core::Username;

use crate::error::AuthError;

/// Maximum accepted password length in bytes (bcrypt ignores anything past 72).
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Validated login credentials.
///
/// ## Invariants
/// - `username` satisfies [`Username`] rules (trimmed, non-empty, bounded).
/// - `password` is non-empty and keeps caller-provided whitespace.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: String,
}

impl LoginCredentials {
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, AuthError> {
        let username =
            Username::parse(username).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if password.is_empty() {
            return Err(AuthError::InvalidInput("password must not be empty".to_owned()));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::InvalidInput(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        Ok(Self {
            username,
            password: password.to_owned(),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl core::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_normalizes_username() {
        let creds = LoginCredentials::try_from_parts(" alice ", " pw ").unwrap();
        assert_eq!(creds.username().as_str(), "alice");
        assert_eq!(creds.password(), " pw ");
    }

    #[test]
    fn rejects_empty_fields() {
        assert!(matches!(
            LoginCredentials::try_from_parts("", "pw"),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            LoginCredentials::try_from_parts("alice", ""),
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_passwords_bcrypt_would_truncate() {
        let long = "p".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(LoginCredentials::try_from_parts("alice", &long).is_err());
    }

    #[test]
    fn debug_hides_password() {
        let creds = LoginCredentials::try_from_parts("alice", "s3cret").unwrap();
        assert!(!format!("{creds:?}").contains("s3cret"));
    }
}
