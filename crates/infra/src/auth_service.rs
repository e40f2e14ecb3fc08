//! Login-or-register and session verification.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use coinshop_auth::{
    AuthError, Hs256SessionTokens, JwtValidator, LoginCredentials, PasswordHasher, SessionClaims,
    SessionToken,
};
use coinshop_core::CredentialHash;
use coinshop_ledger::Account;

use crate::store::{AccountStore, StoreError};

/// Maps a bearer token to its claims. What the HTTP layer depends on.
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

pub struct AuthService<S> {
    store: S,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Hs256SessionTokens,
}

impl<S: AccountStore> AuthService<S> {
    pub fn new(store: S, hasher: Arc<dyn PasswordHasher>, tokens: Hs256SessionTokens) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Log in, creating the account (with the signup bonus) on first use.
    ///
    /// Unknown usernames are provisioned; known ones must present the
    /// password they were created with.
    #[instrument(skip(self, username, password), fields(username = %username.trim()))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, AuthError> {
        let credentials = LoginCredentials::try_from_parts(username, password)?;

        let existing = self
            .store
            .find_by_username(credentials.username())
            .await
            .map_err(internal)?;

        let account = match existing {
            Some(account) => {
                self.check_password(&credentials, &account).await?;
                account
            }
            None => self.provision(&credentials).await?,
        };

        self.tokens
            .issue(account.id, &account.username, Utc::now())
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn provision(&self, credentials: &LoginCredentials) -> Result<Account, AuthError> {
        let hash = self.hash(credentials.password()).await?;
        let account = Account::open(credentials.username().clone(), hash, Utc::now());

        match self.store.create_account(account).await {
            Ok(created) => {
                info!(account_id = %created.id, "account provisioned");
                Ok(created)
            }
            Err(StoreError::UsernameTaken(_)) => {
                // A concurrent first login won; fall back to the normal login path.
                debug!("lost signup race, retrying as login");
                let winner = self
                    .store
                    .find_by_username(credentials.username())
                    .await
                    .map_err(internal)?
                    .ok_or_else(|| {
                        AuthError::Internal("account vanished after conflict".to_owned())
                    })?;
                self.check_password(credentials, &winner).await?;
                Ok(winner)
            }
            Err(e) => Err(internal(e)),
        }
    }

    async fn check_password(
        &self,
        credentials: &LoginCredentials,
        account: &Account,
    ) -> Result<(), AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = credentials.password().to_owned();
        let stored = account.credential_hash.clone();

        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| AuthError::Internal(format!("password check aborted: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if matches {
            Ok(())
        } else {
            warn!(account_id = %account.id, "password mismatch");
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn hash(&self, password: &str) -> Result<CredentialHash, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing aborted: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

impl<S: AccountStore> SessionVerifier for AuthService<S> {
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.tokens.validate(token, Utc::now()).map_err(|e| {
            debug!(reason = %e, "session token rejected");
            AuthError::Unauthorized
        })
    }
}

fn internal(err: StoreError) -> AuthError {
    AuthError::Internal(err.to_string())
}
