//! # Inventory Repository
//!
//! Product reads and stock decrements against the inventory sheet.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    decrement_stock("CAM001", 8)                         │
//! │                                                                         │
//! │  find_row_by_key(Inventory, "CAM001") ──► row 2 (or ProductNotFound)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read_cell × 7 ──► quantity=10, unitPrice=5.00, minStock=3, ...        │
//! │       │                                                                 │
//! │       ├── 10 < 8 ?  → InsufficientStock (nothing written)              │
//! │       ▼                                                                 │
//! │  write_cell(quantity, "2")                                             │
//! │  write_cell(lastUpdated, "2024-03-07 10:15:00")                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StockDecrement { previous: 10, new: 2, low_stock_alert: 2 <= 3 }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lost Updates
//! The read and the write are separate round-trips with no lock between
//! them. Two processes decrementing the same code at once can both read
//! 10 and both write their own result, losing one sale's decrement. A
//! single process running sales one at a time is safe.

use chrono::Local;
use stockbook_core::validation::validate_quantity;
use stockbook_core::{CoreError, Product, StockDecrement, TIMESTAMP_FORMAT};
use tracing::debug;

use super::cells::{data_row_number, field, CellAt};
use crate::error::{DbResult, StockError};
use crate::store::{InventoryColumn, RecordStore, RowRef, Sheet, SheetRow};

/// Repository for the inventory sheet.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InventoryRepository::new(store);
///
/// let product = repo.get_by_code("CAM001").await?;
/// let outcome = repo.decrement_stock("CAM001", 2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository<S> {
    store: S,
}

impl<S: RecordStore> InventoryRepository<S> {
    /// Creates a new InventoryRepository.
    pub fn new(store: S) -> Self {
        InventoryRepository { store }
    }

    /// Every product, in sheet row order.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let records = self.store.list_records(Sheet::Inventory).await?;
        debug!(count = records.len(), "Listing products");

        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let at = CellAt::new(Sheet::Inventory, data_row_number(index));
                product_from_cells(at, |column| field(record, column.header()))
            })
            .collect()
    }

    /// Looks a product up by code. A missing code is `Ok(None)`.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        debug!(code = %code, "Getting product by code");

        match self.store.find_row_by_key(Sheet::Inventory, code).await? {
            Some(row) => self.read_product(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Removes `quantity` units from a product's stock.
    ///
    /// ## Errors
    /// - `CoreError::ProductNotFound` - no row carries `code`
    /// - `CoreError::InsufficientStock` - stock is below `quantity`; nothing is written
    /// - `DbError::InvalidCell` - a cell of the row is unreadable or negative, or
    ///   `unitPrice × quantity` overflows; nothing is written
    /// - `DbError` - a round-trip failed; if the quantity write landed but the
    ///   `lastUpdated` write did not, the stock change stands
    pub async fn decrement_stock(
        &self,
        code: &str,
        quantity: i64,
    ) -> Result<StockDecrement, StockError> {
        validate_quantity(quantity)?;
        debug!(code = %code, quantity, "Decrementing stock");

        let row = self
            .store
            .find_row_by_key(Sheet::Inventory, code)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;

        let product = self.read_product(row).await?;

        if !product.can_sell(quantity) {
            return Err(CoreError::InsufficientStock {
                code: code.to_string(),
                available: product.quantity,
                requested: quantity,
            }
            .into());
        }

        // a line whose subtotal cannot be represented is refused before any write
        CellAt::new(Sheet::Inventory, row.number()).subtotal(
            "unitPrice",
            product.unit_price(),
            quantity,
        )?;

        let new_quantity = product.quantity - quantity;

        self.store
            .write_cell(
                Sheet::Inventory,
                row,
                InventoryColumn::Quantity.index(),
                &new_quantity.to_string(),
            )
            .await?;

        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.store
            .write_cell(Sheet::Inventory, row, InventoryColumn::LastUpdated.index(), &stamp)
            .await?;

        debug!(
            code = %code,
            previous = product.quantity,
            new = new_quantity,
            "Stock decremented"
        );

        Ok(StockDecrement {
            product_id: product.id,
            code: product.code,
            name: product.name,
            unit_price_cents: product.unit_price_cents,
            min_stock: product.min_stock,
            previous_quantity: product.quantity,
            new_quantity,
            low_stock_alert: new_quantity <= product.min_stock,
        })
    }

    /// Appends products below the last inventory row.
    ///
    /// Used by the seed tool; codes are not checked for duplicates.
    pub async fn add_products(&self, products: &[Product]) -> DbResult<()> {
        debug!(count = products.len(), "Adding products");
        let rows: Vec<SheetRow> = products.iter().map(inventory_row).collect();
        self.store.append_rows(Sheet::Inventory, &rows).await
    }

    /// Reads one product row cell by cell.
    async fn read_product(&self, row: RowRef) -> DbResult<Product> {
        let mut cells = Vec::with_capacity(InventoryColumn::HEADERS.len());
        for column in ALL_COLUMNS {
            cells.push(
                self.store
                    .read_cell(Sheet::Inventory, row, column.index())
                    .await?,
            );
        }

        let at = CellAt::new(Sheet::Inventory, row.number());
        product_from_cells(at, |column| cells[column.index() as usize - 1].as_str())
    }
}

const ALL_COLUMNS: [InventoryColumn; 7] = [
    InventoryColumn::Id,
    InventoryColumn::Code,
    InventoryColumn::Name,
    InventoryColumn::Quantity,
    InventoryColumn::UnitPrice,
    InventoryColumn::MinStock,
    InventoryColumn::LastUpdated,
];

fn product_from_cells<'a>(
    at: CellAt,
    cell: impl Fn(InventoryColumn) -> &'a str,
) -> DbResult<Product> {
    let text = |column: InventoryColumn| cell(column).trim().to_string();

    Ok(Product {
        id: text(InventoryColumn::Id),
        code: text(InventoryColumn::Code),
        name: text(InventoryColumn::Name),
        quantity: at.count("quantity", cell(InventoryColumn::Quantity))?,
        unit_price_cents: at.money("unitPrice", cell(InventoryColumn::UnitPrice))?.cents(),
        min_stock: at.count("minStock", cell(InventoryColumn::MinStock))?,
        last_updated: at.timestamp("lastUpdated", cell(InventoryColumn::LastUpdated)),
    })
}

/// Cells of an inventory row, in column order.
pub fn inventory_row(product: &Product) -> SheetRow {
    vec![
        product.id.clone(),
        product.code.clone(),
        product.name.clone(),
        product.quantity.to_string(),
        product.unit_price().to_decimal_string(),
        product.min_stock.to_string(),
        product
            .last_updated
            .map(|stamp| stamp.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
    ]
}

// =============================================================================
// Unit Tests
// =============================================================================
