//! Configuration management for the server.

use crate::store::RetryPolicy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which record store backs the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Redis at the given URL
    Redis { url: String },
    /// Process memory; state is lost on restart
    Memory,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Record store backend
    pub store: StoreBackend,
    /// Maximum pooled Redis connections
    pub redis_pool_size: u32,
    /// Secret the identity provider presents on the login callback
    pub identity_secret: Option<String>,
    /// Bound and backoff of the optimistic update protocol
    pub retry: RetryPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = parse_or(&lookup, "PORT", 3000u16).map_err(|_| ConfigError::InvalidPort)?;

        let store = match lookup("STORE_BACKEND").as_deref() {
            None | Some("redis") => StoreBackend::Redis {
                url: lookup("REDIS_URL").ok_or(ConfigError::MissingRedisUrl)?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let redis_pool_size = parse_or(&lookup, "REDIS_POOL_SIZE", 10u32)?;
        if redis_pool_size == 0 {
            return Err(ConfigError::Invalid("REDIS_POOL_SIZE"));
        }

        let identity_secret = lookup("IDENTITY_SECRET").filter(|s| !s.is_empty());

        let defaults = RetryPolicy::default();
        let max_attempts = parse_or(&lookup, "OPTIMISTIC_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid("OPTIMISTIC_MAX_ATTEMPTS"));
        }
        let base_delay = parse_or(
            &lookup,
            "OPTIMISTIC_BACKOFF_MS",
            defaults.base_delay.as_millis() as u64,
        )?;
        let max_delay = parse_or(
            &lookup,
            "OPTIMISTIC_MAX_BACKOFF_MS",
            defaults.max_delay.as_millis() as u64,
        )?;

        Ok(Self {
            host,
            port,
            store,
            redis_pool_size,
            identity_secret,
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(base_delay),
                max_delay: Duration::from_millis(max_delay.max(base_delay)),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("REDIS_URL environment variable is required")]
    MissingRedisUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Unknown STORE_BACKEND {0:?}, expected \"redis\" or \"memory\"")]
    UnknownBackend(String),

    #[error("Invalid {0} value")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_with_redis() {
        let config = Config::from_lookup(lookup(&[("REDIS_URL", "redis://localhost")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.store,
            StoreBackend::Redis {
                url: "redis://localhost".to_string()
            }
        );
        assert_eq!(config.redis_pool_size, 10);
        assert_eq!(config.identity_secret, None);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn redis_requires_url() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingRedisUrl
        );
    }

    #[test]
    fn memory_backend_needs_no_url() {
        let config = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("PORT", "8080"),
            ("IDENTITY_SECRET", "s3cret"),
            ("OPTIMISTIC_MAX_ATTEMPTS", "8"),
            ("OPTIMISTIC_BACKOFF_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
        assert_eq!(config.identity_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.retry.max_attempts, 8);
        assert_eq!(config.retry.base_delay, Duration::ZERO);
    }

    #[test]
    fn rejects_bad_values() {
        let base = [("STORE_BACKEND", "memory")];
        let with = |extra: (&'static str, &'static str)| {
            let mut vars = base.to_vec();
            vars.push(extra);
            Config::from_lookup(lookup(&vars)).unwrap_err()
        };

        assert_eq!(with(("PORT", "http")), ConfigError::InvalidPort);
        assert_eq!(
            with(("OPTIMISTIC_MAX_ATTEMPTS", "0")),
            ConfigError::Invalid("OPTIMISTIC_MAX_ATTEMPTS")
        );
        assert_eq!(
            with(("REDIS_POOL_SIZE", "-1")),
            ConfigError::Invalid("REDIS_POOL_SIZE")
        );
        assert_eq!(
            with(("REDIS_POOL_SIZE", "0")),
            ConfigError::Invalid("REDIS_POOL_SIZE")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("STORE_BACKEND", "sled")])).unwrap_err(),
            ConfigError::UnknownBackend("sled".to_string())
        );
    }
}
