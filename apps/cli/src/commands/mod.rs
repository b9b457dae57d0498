//! # Command Handlers
//!
//! Each handler takes the injected [`Backend`] and returns a serializable
//! value or an [`ApiError`]. Handlers hold no state of their own.
//!
//! ## Command Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Command Modules                                │
//! │                                                                         │
//! │  inventory.rs    - list inventory, look up one product                  │
//! │  sale.rs         - process a cart                                       │
//! │  report.rs       - history, daily summary, low-stock alerts             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod inventory;
pub mod report;
pub mod sale;

use serde::Serialize;
use serde_json::Value;
use stockbook_db::{Backend, RecordStore, Report};

use crate::cli::{Command, USAGE};
use crate::error::ApiError;

/// Successful result of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub data: Value,
    /// Set when a report fell back to empty data because the store failed.
    pub warning: Option<String>,
}

impl CommandOutput {
    /// Wraps a complete result.
    pub fn data<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        Ok(CommandOutput {
            data: to_json(value)?,
            warning: None,
        })
    }

    /// Unwraps a report, carrying its degradation reason as a warning.
    pub fn report<T: Serialize>(report: Report<T>) -> Result<Self, ApiError> {
        Ok(CommandOutput {
            data: to_json(&report.data)?,
            warning: report.degraded,
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal(format!("Failed to serialize response: {e}")))
}

/// Runs `command` against `backend`.
pub async fn execute<S: RecordStore>(
    backend: &Backend<S>,
    command: Command,
) -> Result<CommandOutput, ApiError> {
    match command {
        Command::Inventory => CommandOutput::data(&inventory::list_inventory(backend).await?),
        Command::Product { code } => {
            CommandOutput::data(&inventory::get_product(backend, &code).await?)
        }
        Command::Sale(request) => CommandOutput::data(&sale::process_sale(backend, request).await?),
        Command::History { limit, from, to } => CommandOutput::report(
            report::sales_history(backend, limit, from.as_deref(), to.as_deref()).await?,
        ),
        Command::Summary { date } => {
            CommandOutput::report(report::daily_summary(backend, date.as_deref()).await?)
        }
        Command::Alerts => CommandOutput::report(report::low_stock_alerts(backend).await),
        Command::Help => CommandOutput::data(&USAGE),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use stockbook_core::Product;
    use stockbook_db::{Backend, MemoryStore};

    /// Backend over a memory store holding CAM001 (10 @ 5.00, min 3) and
    /// PAN001 (4 @ 12.50, min 2).
    pub async fn seeded_backend() -> (MemoryStore, Backend<MemoryStore>) {
        let store = MemoryStore::new();
        let backend = Backend::new(store.clone());
        backend
            .inventory()
            .add_products(&[
                product("1", "CAM001", "Camisa", 10, 500, 3),
                product("2", "PAN001", "Pantalón", 4, 1250, 2),
            ])
            .await
            .unwrap();
        (store, backend)
    }

    fn product(id: &str, code: &str, name: &str, qty: i64, price: i64, min: i64) -> Product {
        Product {
            id: id.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            quantity: qty,
            unit_price_cents: price,
            min_stock: min,
            last_updated: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::seeded_backend;
    use super::*;
    use crate::error::ErrorCode;
    use stockbook_core::CartItem;

    use crate::cli::SaleRequest;

    #[tokio::test]
    async fn test_execute_sale_then_reports() {
        let (_, backend) = seeded_backend().await;

        let sale = execute(
            &backend,
            Command::Sale(SaleRequest {
                cart: vec![CartItem::new("CAM001", 8)],
                vendor: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(sale.data["total"], "40.00");
        assert!(sale.warning.is_none());

        let history = execute(
            &backend,
            Command::History {
                limit: None,
                from: None,
                to: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(history.data.as_array().unwrap().len(), 1);
        assert_eq!(history.data[0]["vendor"], "Sistema");

        let alerts = execute(&backend, Command::Alerts).await.unwrap();
        assert_eq!(alerts.data[0]["code"], "CAM001");
    }

    #[tokio::test]
    async fn test_degraded_report_becomes_warning() {
        let (store, backend) = seeded_backend().await;
        store.fail_reads(true);

        let output = execute(&backend, Command::Alerts).await.unwrap();
        assert_eq!(output.data, serde_json::json!([]));
        assert!(output.warning.unwrap().contains("injected read failure"));
    }

    #[tokio::test]
    async fn test_execute_maps_errors() {
        let (_, backend) = seeded_backend().await;

        let err = execute(
            &backend,
            Command::Product {
                code: "ZAP001".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = execute(
            &backend,
            Command::Summary {
                date: Some("07/03/2024".to_string()),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
