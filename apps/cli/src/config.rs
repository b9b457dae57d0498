//! CLI configuration.
//!
//! Configuration is loaded from `STOCKBOOK_*` environment variables with
//! fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use stockbook_core::DEFAULT_VENDOR;
use stockbook_db::SqliteConfig;

/// Default log filter when neither `STOCKBOOK_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,stockbook=debug,sqlx=warn";

/// Runtime settings of one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Workbook file, or `:memory:` for a throwaway store
    pub workbook: PathBuf,

    /// Pool size of the SQLite backend
    pub max_connections: u32,

    /// How long to wait for a pooled connection
    pub connect_timeout: Duration,

    /// Vendor recorded when a sale names none
    pub default_vendor: String,

    /// Reject a cart up front when a code's total demand exceeds its stock
    pub precheck_demand: bool,

    /// `tracing-subscriber` filter directive
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = AppConfig {
            workbook: var("STOCKBOOK_WORKBOOK")
                .unwrap_or_else(|| "./stockbook.db".to_string())
                .into(),

            max_connections: var("STOCKBOOK_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKBOOK_MAX_CONNECTIONS".to_string()))?,

            connect_timeout: var("STOCKBOOK_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| {
                    ConfigError::InvalidValue("STOCKBOOK_CONNECT_TIMEOUT_SECS".to_string())
                })?,

            default_vendor: var("STOCKBOOK_DEFAULT_VENDOR")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_VENDOR.to_string()),

            precheck_demand: match var("STOCKBOOK_PRECHECK_DEMAND") {
                Some(v) => parse_flag(&v)
                    .ok_or_else(|| ConfigError::InvalidValue("STOCKBOOK_PRECHECK_DEMAND".to_string()))?,
                None => false,
            },

            log_filter: var("STOCKBOOK_LOG")
                .or_else(|| var("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKBOOK_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Backend settings derived from this configuration.
    pub fn sqlite_config(&self) -> SqliteConfig {
        let config = SqliteConfig::new(self.workbook.clone());
        let config = if config.is_in_memory() {
            SqliteConfig::in_memory()
        } else {
            config.max_connections(self.max_connections)
        };
        config.connect_timeout(self.connect_timeout)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.workbook, PathBuf::from("./stockbook.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.default_vendor, "Sistema");
        assert!(!config.precheck_demand);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOCKBOOK_WORKBOOK", ":memory:"),
            ("STOCKBOOK_MAX_CONNECTIONS", "2"),
            ("STOCKBOOK_CONNECT_TIMEOUT_SECS", "3"),
            ("STOCKBOOK_DEFAULT_VENDOR", " Caja 1 "),
            ("STOCKBOOK_PRECHECK_DEMAND", "yes"),
            ("RUST_LOG", "warn"),
        ])
        .unwrap();

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.default_vendor, "Caja 1");
        assert!(config.precheck_demand);
        assert_eq!(config.log_filter, "warn");
        assert!(config.sqlite_config().is_in_memory());
    }

    #[test]
    fn test_stockbook_log_wins_over_rust_log() {
        let config = load(&[("STOCKBOOK_LOG", "debug"), ("RUST_LOG", "warn")]).unwrap();
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("STOCKBOOK_DEFAULT_VENDOR", "  "), ("STOCKBOOK_WORKBOOK", "")]).unwrap();
        assert_eq!(config.default_vendor, "Sistema");
        assert_eq!(config.workbook, PathBuf::from("./stockbook.db"));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("STOCKBOOK_MAX_CONNECTIONS", "many"),
            ("STOCKBOOK_MAX_CONNECTIONS", "0"),
            ("STOCKBOOK_CONNECT_TIMEOUT_SECS", "-1"),
            ("STOCKBOOK_PRECHECK_DEMAND", "maybe"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid value for {key}"));
        }
    }
}
