//! # Record Store Adapter
//!
//! The narrow interface every backend offers: a handful of row/cell
//! primitives over two fixed worksheets.
//!
//! ## Worksheet Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inventory                                                              │
//! │  row 1 │ id │ code │ name │ quantity │ unitPrice │ minStock │ lastUpd.  │
//! │  row 2 │ 1  │CAM001│Camisa│    10    │   5.00    │    3     │           │
//! │  ...                                                                    │
//! │                                                                         │
//! │  Sales                                                                  │
//! │  row 1 │ saleId │ date │ time │ productId │ code │ name │ quantity │    │
//! │        │ unitPrice │ subtotal │ total │ vendor                          │
//! │  ...   one row per sold line, all lines of a sale share saleId          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row 1 holds headers. Rows and columns are 1-based. Every cell is text;
//! parsing into numbers happens in the repositories.
//!
//! ## Backends
//! - [`sqlite::SqliteStore`] - worksheets emulated in a SQLite table
//! - [`memory::MemoryStore`] - in-process worksheets with failure injection

pub mod memory;
pub mod sqlite;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use crate::error::DbResult;

/// Row number of the header row.
pub const HEADER_ROW: u32 = 1;

/// One data row keyed by header name.
pub type Record = BTreeMap<String, String>;

/// Cell values of one row, in column order.
pub type SheetRow = Vec<String>;

// =============================================================================
// Sheets
// =============================================================================

/// The two worksheets of a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sheet {
    Inventory,
    Sales,
}

impl Sheet {
    /// Every sheet, in workbook order.
    pub const ALL: [Sheet; 2] = [Sheet::Inventory, Sheet::Sales];

    /// Worksheet title.
    pub const fn title(self) -> &'static str {
        match self {
            Sheet::Inventory => "Inventory",
            Sheet::Sales => "Sales",
        }
    }

    /// Header row contents.
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Sheet::Inventory => &InventoryColumn::HEADERS,
            Sheet::Sales => &SalesColumn::HEADERS,
        }
    }

    /// Column searched by `find_row_by_key`.
    pub const fn key_column(self) -> u32 {
        match self {
            Sheet::Inventory => InventoryColumn::Code.index(),
            Sheet::Sales => SalesColumn::SaleId.index(),
        }
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Columns of the inventory sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryColumn {
    Id = 1,
    Code,
    Name,
    Quantity,
    UnitPrice,
    MinStock,
    LastUpdated,
}

impl InventoryColumn {
    pub const HEADERS: [&'static str; 7] = [
        "id",
        "code",
        "name",
        "quantity",
        "unitPrice",
        "minStock",
        "lastUpdated",
    ];

    /// 1-based column index.
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Header text of this column.
    pub const fn header(self) -> &'static str {
        Self::HEADERS[self as usize - 1]
    }
}

/// Columns of the sales ledger sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesColumn {
    SaleId = 1,
    Date,
    Time,
    ProductId,
    Code,
    Name,
    Quantity,
    UnitPrice,
    Subtotal,
    Total,
    Vendor,
}

impl SalesColumn {
    pub const HEADERS: [&'static str; 11] = [
        "saleId",
        "date",
        "time",
        "productId",
        "code",
        "name",
        "quantity",
        "unitPrice",
        "subtotal",
        "total",
        "vendor",
    ];

    /// 1-based column index.
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Header text of this column.
    pub const fn header(self) -> &'static str {
        Self::HEADERS[self as usize - 1]
    }
}

// =============================================================================
// Row Reference
// =============================================================================

/// Opaque 1-based row position inside a sheet.
///
/// Only valid until rows are inserted above it; nothing in this crate
/// ever does that, appends go to the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowRef(u32);

impl RowRef {
    /// Wraps a 1-based row number.
    pub const fn new(row: u32) -> Self {
        RowRef(row)
    }

    /// 1-based row number.
    pub const fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Record Store Trait
// =============================================================================

/// Row/cell primitives over the workbook.
///
/// ## Contract
/// - Every call is a round-trip; nothing is cached between calls.
/// - No call spans more than one primitive atomically. A decrement is a
///   read followed by a write, and another writer can land in between.
/// - Handles are cheap to clone and share one underlying workbook.
///
/// ## Implementing
/// Methods are written as `async fn` in the impl:
/// ```rust,ignore
/// impl RecordStore for MyStore {
///     async fn read_cell(&self, sheet: Sheet, row: RowRef, column: u32) -> DbResult<String> {
///         ...
///     }
/// }
/// ```
pub trait RecordStore: Clone + Send + Sync + 'static {
    /// Finds the first data row whose key column equals `key`.
    fn find_row_by_key(
        &self,
        sheet: Sheet,
        key: &str,
    ) -> impl Future<Output = DbResult<Option<RowRef>>> + Send;

    /// Reads one cell; absent cells read as `""`.
    fn read_cell(
        &self,
        sheet: Sheet,
        row: RowRef,
        column: u32,
    ) -> impl Future<Output = DbResult<String>> + Send;

    /// Overwrites one cell.
    fn write_cell(
        &self,
        sheet: Sheet,
        row: RowRef,
        column: u32,
        value: &str,
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Appends rows below the last used row.
    ///
    /// On failure a backend may already have accepted a prefix of `rows`.
    fn append_rows(
        &self,
        sheet: Sheet,
        rows: &[SheetRow],
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Every data row as `header -> value`, in row order. Blank rows are skipped.
    fn list_records(&self, sheet: Sheet) -> impl Future<Output = DbResult<Vec<Record>>> + Send;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_indices_match_headers() {
        assert_eq!(InventoryColumn::Code.index(), 2);
        assert_eq!(InventoryColumn::Code.header(), "code");
        assert_eq!(InventoryColumn::LastUpdated.index(), 7);
        assert_eq!(InventoryColumn::LastUpdated.header(), "lastUpdated");

        assert_eq!(SalesColumn::SaleId.index(), 1);
        assert_eq!(SalesColumn::Vendor.index(), 11);
        assert_eq!(SalesColumn::Vendor.header(), "vendor");
    }

    #[test]
    fn test_sheet_layout() {
        assert_eq!(Sheet::Inventory.title(), "Inventory");
        assert_eq!(Sheet::Sales.to_string(), "Sales");
        assert_eq!(Sheet::Inventory.key_column(), 2);
        assert_eq!(Sheet::Sales.key_column(), 1);
        assert_eq!(Sheet::Sales.headers().len(), 11);
    }
}
