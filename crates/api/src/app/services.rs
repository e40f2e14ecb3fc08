//! Service wiring: picks the account store and builds the services on top of it.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use coinshop_auth::{BcryptHasher, Hs256SessionTokens, PasswordHasher};
use coinshop_infra::{
    AccountStore, AuthService, InMemoryAccountStore, LedgerService, PostgresAccountStore,
};

use crate::config::AppConfig;

/// Type-erased store shared by both services.
pub type DynStore = Arc<dyn AccountStore>;

pub struct AppServices {
    pub ledger: LedgerService<DynStore>,
    pub auth: Arc<AuthService<DynStore>>,
}

impl AppServices {
    pub fn new(
        store: DynStore,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Hs256SessionTokens,
    ) -> Self {
        Self {
            ledger: LedgerService::new(store.clone()),
            auth: Arc::new(AuthService::new(store, hasher, tokens)),
        }
    }

    /// Services over a fresh in-memory store (dev/test).
    pub fn in_memory(config: &AppConfig) -> anyhow::Result<Self> {
        Self::with_store(Arc::new(InMemoryAccountStore::new()), config)
    }

    fn with_store(store: DynStore, config: &AppConfig) -> anyhow::Result<Self> {
        let hasher = BcryptHasher::new(config.bcrypt_cost).context("invalid bcrypt cost")?;
        let tokens = Hs256SessionTokens::new(config.jwt_secret.as_bytes(), config.token_ttl);
        Ok(Self::new(store, Arc::new(hasher), tokens))
    }
}

/// Build services for the configured backend.
///
/// With `DATABASE_URL` set, connects to Postgres and applies the schema;
/// otherwise falls back to the in-memory store.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: DynStore = match &config.database_url {
        Some(url) => {
            let store = PostgresAccountStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store.migrate().await.context("failed to apply database schema")?;
            info!(
                max_connections = config.database_max_connections,
                "using Postgres account store"
            );
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory account store (state is lost on restart)");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    AppServices::with_store(store, config)
}
