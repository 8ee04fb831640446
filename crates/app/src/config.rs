//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use shopcart_cart::DEFAULT_CHECKOUT_DELAY;
use shopcart_observability::{LogFormat, LogSettings};
use thiserror::Error;

pub const DB_PATH_VAR: &str = "SHOPCART_DB_PATH";
pub const API_URL_VAR: &str = "SHOPCART_API_URL";
pub const CHECKOUT_DELAY_VAR: &str = "SHOPCART_CHECKOUT_DELAY_MS";
pub const LOG_FORMAT_VAR: &str = "SHOPCART_LOG_FORMAT";

pub const DEFAULT_API_URL: &str = "https://65c38b5339055e7482c12050.mockapi.io/api/";

/// Value of `SHOPCART_DB_PATH` selecting a throwaway database.
const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}='{value}' is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot determine default database path: {0}")]
    NoDataDir(String),
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbLocation,
    pub api_url: String,
    pub checkout_delay: Duration,
    pub log: LogSettings,
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank values take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let db = match get(DB_PATH_VAR) {
            Some(value) if value.trim() == IN_MEMORY => DbLocation::InMemory,
            Some(value) => DbLocation::File(PathBuf::from(value.trim())),
            None => DbLocation::File(
                shopcart_infra::default_db_path()
                    .map_err(|e| ConfigError::NoDataDir(format!("{e:#}")))?,
            ),
        };

        let api_url = match get(API_URL_VAR) {
            Some(value) => parse_api_url(&value)?,
            None => DEFAULT_API_URL.to_owned(),
        };

        let checkout_delay = match get(CHECKOUT_DELAY_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::invalid(CHECKOUT_DELAY_VAR, &value, e))?,
            None => DEFAULT_CHECKOUT_DELAY,
        };

        let mut log = LogSettings::default();
        if let Some(value) = get(LOG_FORMAT_VAR) {
            log.format = value
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT_VAR, &value, e))?;
        }

        Ok(Self {
            db,
            api_url,
            checkout_delay,
            log,
        })
    }
}

fn parse_api_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::invalid(
            API_URL_VAR,
            value,
            "expected an http:// or https:// URL",
        ));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            (DB_PATH_VAR, "/tmp/cart.db"),
            (API_URL_VAR, "http://localhost:3000/api"),
            (CHECKOUT_DELAY_VAR, "250"),
            (LOG_FORMAT_VAR, "pretty"),
        ])
        .unwrap();

        assert_eq!(cfg.db, DbLocation::File(PathBuf::from("/tmp/cart.db")));
        assert_eq!(cfg.api_url, "http://localhost:3000/api");
        assert_eq!(cfg.checkout_delay, Duration::from_millis(250));
        assert_eq!(cfg.log.format, LogFormat::Pretty);
    }

    #[test]
    fn defaults_apply_for_missing_or_blank_values() {
        let cfg = config(&[(DB_PATH_VAR, ":memory:"), (API_URL_VAR, "  ")]).unwrap();

        assert_eq!(cfg.db, DbLocation::InMemory);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.checkout_delay, Duration::from_secs(2));
        assert_eq!(cfg.log, LogSettings::default());
    }

    #[test]
    fn bad_delay_is_reported_with_its_variable() {
        let err = config(&[(DB_PATH_VAR, ":memory:"), (CHECKOUT_DELAY_VAR, "soon")]).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { var: CHECKOUT_DELAY_VAR, .. }));
    }

    #[test]
    fn non_http_api_url_is_rejected() {
        let err = config(&[(DB_PATH_VAR, ":memory:"), (API_URL_VAR, "ftp://example.test")])
            .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { var: API_URL_VAR, .. }));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = config(&[(DB_PATH_VAR, ":memory:"), (LOG_FORMAT_VAR, "xml")]).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { var: LOG_FORMAT_VAR, .. }));
    }
}
