use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Bounds of the checkout read-validate-commit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    /// How long a commit may wait on a row held by another checkout.
    pub lock_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            lock_timeout: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub checkout: CheckoutConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let pool_size = parse_or(&lookup, "DB_POOL_SIZE", 10u32)?;

        let defaults = CheckoutConfig::default();
        let max_attempts = parse_or(&lookup, "CHECKOUT_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "CHECKOUT_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let lock_timeout_ms = parse_or(
            &lookup,
            "CHECKOUT_LOCK_TIMEOUT_MS",
            defaults.lock_timeout.as_millis() as u64,
        )?;
        // PostgreSQL reads 0 as "wait forever" and caps the setting at i32::MAX.
        if lock_timeout_ms == 0 || lock_timeout_ms > i32::MAX as u64 {
            return Err(ConfigError::Invalid {
                name: "CHECKOUT_LOCK_TIMEOUT_MS",
                value: lock_timeout_ms.to_string(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            pool_size,
            checkout: CheckoutConfig {
                max_attempts,
                lock_timeout: Duration::from_millis(lock_timeout_ms),
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
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
