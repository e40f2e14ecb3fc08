//! Signed session tokens (HS256 JWT).
//!
//! The signing key is process-wide configuration and never travels inside a
//! token. Validation checks the signature first, then the claim time window.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use coinshop_core::{AccountId, Username};

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Opaque bearer credential handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature mismatch")]
    InvalidSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Token verification boundary consumed by the HTTP layer.
///
/// Takes `now` explicitly so expiry handling is deterministic under test.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HS256 issuer + validator sharing one secret.
#[derive(Clone)]
pub struct Hs256SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256SessionTokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token binding `account` and `username`, expiring `ttl` after `now`.
    pub fn issue(
        &self,
        account: AccountId,
        username: &Username,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, TokenError> {
        let claims = SessionClaims::new(account, username, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(SessionToken)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn validation() -> Validation {
        // Time-window checks are done by `validate_claims` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl JwtValidator for Hs256SessionTokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for Hs256SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256SessionTokens")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(secret: &str) -> Hs256SessionTokens {
        Hs256SessionTokens::new(secret.as_bytes(), Duration::hours(24))
    }

    fn alice() -> Username {
        Username::parse("alice").unwrap()
    }

    #[test]
    fn issued_token_validates_and_carries_identity() {
        let issuer = tokens("test-secret");
        let account = AccountId::new();
        let now = Utc::now();

        let token = issuer.issue(account, &alice(), now).unwrap();
        let claims = issuer.validate(token.as_str(), now).unwrap();

        assert_eq!(claims.sub, account);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let now = Utc::now();
        let token = tokens("secret-a").issue(AccountId::new(), &alice(), now).unwrap();
        assert_eq!(
            tokens("secret-b").validate(token.as_str(), now),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let issuer = tokens("test-secret");
        let now = Utc::now();
        let token = issuer.issue(AccountId::new(), &alice(), now).unwrap();

        let mut parts: Vec<String> = token.as_str().split('.').map(str::to_owned).collect();
        let forged = issuer.issue(AccountId::new(), &alice(), now).unwrap();
        parts[1] = forged.as_str().split('.').nth(1).unwrap().to_owned();

        assert!(issuer.validate(&parts.join("."), now).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = tokens("test-secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = issuer.issue(AccountId::new(), &alice(), issued).unwrap();
        assert_eq!(
            issuer.validate(token.as_str(), Utc::now()),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = tokens("test-secret");
        assert!(matches!(
            issuer.validate("not.a.jwt", Utc::now()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn debug_never_prints_token_material() {
        let token = tokens("s").issue(AccountId::new(), &alice(), Utc::now()).unwrap();
        assert_eq!(format!("{token:?}"), "SessionToken(<redacted>)");
    }
}
