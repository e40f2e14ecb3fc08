use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coinshop_core::{AccountId, Username};

/// Tolerated clock drift between the issuer and the validator, in seconds.
const CLOCK_SKEW_SECS: i64 = 30;

/// Session token claims (transport-agnostic).
///
/// Uses the registered `sub`/`iat`/`exp` claim names with Unix-second
/// timestamps so tokens stay readable by any JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated account.
    pub sub: AccountId,

    /// Username bound into the token at issuance.
    pub username: String,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Absolute expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        sub: AccountId,
        username: &Username,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expires_at = issued_at + ttl;
        Self {
            sub,
            username: username.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token`] before the claims are trusted.
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now + CLOCK_SKEW_SECS < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(now: DateTime<Utc>) -> SessionClaims {
        let username = Username::parse("alice").unwrap();
        SessionClaims::new(AccountId::new(), &username, now, Duration::hours(24))
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now), Ok(()));
    }

    #[test]
    fn expiry_is_absolute_24_hours_after_issuance() {
        let now = Utc::now();
        let claims = claims_at(now);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert_eq!(
            validate_claims(&claims, now + Duration::hours(24)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(validate_claims(&claims, now + Duration::hours(23)), Ok(()));
    }

    #[test]
    fn claims_from_the_future_are_rejected() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(5));
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn claims_use_registered_names_on_the_wire() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = claims_at(now);
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["sub"], claims.sub.to_string());
        assert_eq!(value["username"], "alice");
        assert_eq!(value["iat"], 1_700_000_000);
        assert_eq!(value["exp"], 1_700_000_000 + 24 * 60 * 60);
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
