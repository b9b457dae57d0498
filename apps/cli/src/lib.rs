//! # stockbook-cli
//!
//! Command-line front end of the Stockbook point-of-sale backend.
//!
//! ## Lifecycle of One Invocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AppConfig::from_env()      STOCKBOOK_* variables                    │
//! │  2. init_tracing()             logs → stderr                            │
//! │  3. cli::parse_args()          argv → Command                           │
//! │  4. open_backend()             SqliteStore + migrations + headers       │
//! │  5. commands::execute()        Command → CommandOutput | ApiError       │
//! │  6. Envelope                   one JSON document → stdout               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`cli`] - Argument parsing and the sale request body
//! - [`commands`] - Handlers over an injected [`Backend`]
//! - [`config`] - Environment configuration
//! - [`error`] - [`ApiError`] and the mapping from backend errors
//! - [`response`] - The JSON envelope

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod response;

use stockbook_db::{Backend, DbError, SqliteStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Command;
use crate::config::{AppConfig, DEFAULT_LOG_FILTER};
use crate::error::ApiError;
use crate::response::Envelope;

/// Initializes the tracing subscriber, writing to stderr.
///
/// An unparseable `filter` falls back to the default filter.
pub fn init_tracing(filter: &str) {
    let (filter, rejected) = match EnvFilter::try_new(filter) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = rejected {
        warn!(error = %e, "Invalid log filter, using default");
    }
}

/// Connects to the configured workbook and wraps it in a [`Backend`].
pub async fn open_backend(config: &AppConfig) -> Result<Backend<SqliteStore>, DbError> {
    let store = SqliteStore::connect(config.sqlite_config()).await?;

    info!(
        workbook = %config.workbook.display(),
        vendor = %config.default_vendor,
        precheck = config.precheck_demand,
        "Workbook opened"
    );

    Ok(Backend::new(store)
        .with_default_vendor(config.default_vendor.clone())
        .with_demand_precheck(config.precheck_demand))
}

/// Opens the workbook, runs `command` and closes the pool again.
pub async fn run(config: &AppConfig, command: Command) -> Envelope {
    let backend = match open_backend(config).await {
        Ok(backend) => backend,
        Err(e) => return Envelope::failure(ApiError::from(e)),
    };

    let result = commands::execute(&backend, command).await;
    backend.store().close().await;
    Envelope::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_args;
    use crate::error::ErrorCode;

    fn memory_config() -> AppConfig {
        AppConfig::from_lookup(|key| (key == "STOCKBOOK_WORKBOOK").then(|| ":memory:".to_string()))
            .unwrap()
    }

    fn command(args: &[&str]) -> Command {
        parse_args(args.iter().map(|s| s.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_run_on_fresh_workbook() {
        let config = memory_config();

        let envelope = run(&config, command(&["inventory"])).await;
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(serde_json::json!([])));

        let envelope = run(&config, command(&["sale", "CAM001:1"])).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.unwrap().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_unopenable_workbook_is_persistence_error() {
        let config = AppConfig::from_lookup(|key| {
            (key == "STOCKBOOK_WORKBOOK")
                .then(|| "/nonexistent-stockbook-dir/sub/stockbook.db".to_string())
        })
        .unwrap();

        let envelope = run(&config, command(&["alerts"])).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.unwrap().code, ErrorCode::PersistenceError);
    }
}
