//! Inventory commands.

use serde::Serialize;
use stockbook_core::{Product, TIMESTAMP_FORMAT};
use stockbook_db::{Backend, RecordStore};
use tracing::{debug, info};

use crate::error::ApiError;

/// Product as printed by `inventory` and `product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    /// Decimal string, e.g. `"5.00"`
    pub unit_price: String,
    pub unit_price_cents: i64,
    pub min_stock: i64,
    pub low_stock: bool,
    pub last_updated: Option<String>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            unit_price: p.unit_price().to_decimal_string(),
            low_stock: p.is_low_stock(),
            last_updated: p
                .last_updated
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            id: p.id,
            code: p.code,
            name: p.name,
            quantity: p.quantity,
            unit_price_cents: p.unit_price_cents,
            min_stock: p.min_stock,
        }
    }
}

/// Every product, in sheet order.
pub async fn list_inventory<S: RecordStore>(
    backend: &Backend<S>,
) -> Result<Vec<ProductDto>, ApiError> {
    debug!("list_inventory called");

    let products = backend.inventory().get_all().await?;

    info!(count = products.len(), "Inventory loaded");
    Ok(products.into_iter().map(ProductDto::from).collect())
}

/// One product by code.
pub async fn get_product<S: RecordStore>(
    backend: &Backend<S>,
    code: &str,
) -> Result<ProductDto, ApiError> {
    debug!(code = %code, "get_product called");

    backend
        .inventory()
        .get_by_code(code)
        .await?
        .map(ProductDto::from)
        .ok_or_else(|| ApiError::not_found("Product", code))
}
