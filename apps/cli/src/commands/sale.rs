//! # Sale Command
//!
//! ```text
//! SaleRequest { cart, vendor }
//!      │
//!      ▼
//! SaleProcessor::process_sale ──► Err(SaleError) ──► ApiError
//!      │
//!      ▼
//! SaleResponse { saleId, total, itemCount, lines, alerts }
//! ```

use serde::Serialize;
use stockbook_core::{SaleAlert, SaleLineResult, SaleResult};
use stockbook_db::{Backend, RecordStore};
use tracing::{debug, info};

use crate::cli::SaleRequest;
use crate::error::ApiError;

/// Printed after a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub sale_id: String,
    /// Decimal string, e.g. `"40.00"`
    pub total: String,
    pub total_cents: i64,
    pub item_count: usize,
    pub lines: Vec<SaleLineResult>,
    pub alerts: Vec<SaleAlert>,
}

impl From<SaleResult> for SaleResponse {
    fn from(sale: SaleResult) -> Self {
        SaleResponse {
            sale_id: sale.sale_id.to_string(),
            total: sale.total().to_decimal_string(),
            total_cents: sale.total_cents,
            item_count: sale.item_count,
            lines: sale.lines,
            alerts: sale.alerts,
        }
    }
}

/// Sells every line of `request`.
pub async fn process_sale<S: RecordStore>(
    backend: &Backend<S>,
    request: SaleRequest,
) -> Result<SaleResponse, ApiError> {
    debug!(lines = request.cart.len(), vendor = ?request.vendor, "process_sale called");

    let sale = backend
        .sales()
        .process_sale(&request.cart, request.vendor.as_deref())
        .await?;

    info!(
        sale_id = %sale.sale_id,
        total = %sale.total(),
        alerts = sale.alerts.len(),
        "Sale completed"
    );
    Ok(sale.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::seeded_backend;
    use crate::error::ErrorCode;
    use stockbook_core::CartItem;
    use stockbook_db::Sheet;

    fn request(lines: &[(&str, i64)], vendor: Option<&str>) -> SaleRequest {
        SaleRequest {
            cart: lines
                .iter()
                .map(|&(code, qty)| CartItem::new(code, qty))
                .collect(),
            vendor: vendor.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_sale_with_low_stock_alert() {
        let (store, backend) = seeded_backend().await;

        let sale = process_sale(&backend, request(&[("CAM001", 8)], Some("Ana")))
            .await
            .unwrap();

        assert_eq!(sale.total, "40.00");
        assert_eq!(sale.item_count, 1);
        assert_eq!(sale.alerts.len(), 1);
        assert_eq!(sale.alerts[0].remaining_quantity, 2);

        let ledger = store.data_rows(Sheet::Sales);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0][0], sale.sale_id);
        assert_eq!(ledger[0][10], "Ana");

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["alerts"][0]["productName"], "Camisa");
    }

    #[tokio::test]
    async fn test_insufficient_stock() {
        let (_, backend) = seeded_backend().await;

        let err = process_sale(&backend, request(&[("PAN001", 5)], None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 4, requested 5"));
    }

    #[tokio::test]
    async fn test_quantity_above_stock_is_not_a_validation_error() {
        let (_, backend) = seeded_backend().await;

        let err = process_sale(&backend, request(&[(" CAM001 ", 1000)], None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 10, requested 1000"));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (store, backend) = seeded_backend().await;

        let err = process_sale(&backend, request(&[], None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(store.append_calls(), 1); // seed only
    }

    #[tokio::test]
    async fn test_ledger_failure_reports_decremented_stock() {
        let (store, backend) = seeded_backend().await;
        store.fail_appends_after(Some(0));

        let err = process_sale(&backend, request(&[("CAM001", 1)], None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(err.message.contains("stock decremented"));

        let camisa = backend.inventory().get_by_code("CAM001").await.unwrap().unwrap();
        assert_eq!(camisa.quantity, 9);
    }
}
