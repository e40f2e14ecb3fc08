//! Process configuration, read from environment variables.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, ensure};

use coinshop_observability::LogFormat;

/// Signing key used when `JWT_SECRET` is unset. Startup logs a warning.
pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset. Values that are present but do not parse
    /// are errors, never silently replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let token_ttl_hours: i64 = parse_or(var("TOKEN_TTL_HOURS"), "TOKEN_TTL_HOURS", 24)?;
        ensure!(
            (1..=24 * 365).contains(&token_ttl_hours),
            "TOKEN_TTL_HOURS must be between 1 and 8760, got {token_ttl_hours}"
        );

        let bcrypt_cost: u32 = parse_or(var("BCRYPT_COST"), "BCRYPT_COST", 10)?;
        ensure!(
            (4..=31).contains(&bcrypt_cost),
            "BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"
        );

        let database_max_connections: u32 =
            parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10)?;
        ensure!(
            database_max_connections > 0,
            "DATABASE_MAX_CONNECTIONS must be positive"
        );

        Ok(Self {
            host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(var("SERVER_PORT"), "SERVER_PORT", 8080)?,
            jwt_secret: var("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_owned()),
            token_ttl: chrono::Duration::hours(token_ttl_hours),
            bcrypt_cost,
            database_url: var("DATABASE_URL"),
            database_max_connections,
            log_format: parse_or(var("LOG_FORMAT"), "LOG_FORMAT", LogFormat::Json)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("database_max_connections", &self.database_max_connections)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {key}: '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert!(cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, chrono::Duration::hours(24));
        assert_eq!(cfg.bcrypt_cost, 10);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.database_max_connections, 10);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = config(&[
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_HOURS", "2"),
            ("BCRYPT_COST", "4"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert!(!cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, chrono::Duration::hours(2));
        assert_eq!(cfg.bcrypt_cost, 4);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("DATABASE_URL", "  "), ("SERVER_PORT", "")]).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err = config(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
        assert!(config(&[("BCRYPT_COST", "3")]).is_err());
        assert!(config(&[("TOKEN_TTL_HOURS", "0")]).is_err());
        assert!(config(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = config(&[
            ("JWT_SECRET", "topsecret"),
            ("DATABASE_URL", "postgres://u:pw@h/db"),
        ])
        .unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("pw@h"));
    }
}
