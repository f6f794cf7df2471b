//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: String,
    pub content_model: String,
    pub status_interval: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Load Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        // --- Load the Generative Service Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let content_model =
            lookup("CONTENT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let interval_str = lookup("STATUS_INTERVAL_MS").unwrap_or_else(|| "1500".to_string());
        let status_interval = match interval_str.parse::<u64>() {
            Ok(ms) if ms > 0 => Duration::from_millis(ms),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "STATUS_INTERVAL_MS".to_string(),
                    format!("'{}' is not a positive number of milliseconds", interval_str),
                ))
            }
        };

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            content_model,
            status_interval,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.content_model, "gpt-4o-mini");
        assert_eq!(config.status_interval, Duration::from_millis(1500));
    }

    #[test]
    fn api_key_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "OPENAI_API_KEY"));

        let err = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("STATUS_INTERVAL_MS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "STATUS_INTERVAL_MS"));

        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BIND_ADDRESS", "nowhere"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "BIND_ADDRESS"));
    }
}
