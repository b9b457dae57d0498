//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │   SaleResult    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  code           │   │  sale_id        │       │
//! │  │  code (key)     │   │  quantity_sold  │   │  total_cents    │       │
//! │  │  quantity       │   └────────┬────────┘   │  lines, alerts  │       │
//! │  │  min_stock      │            │            └────────▲────────┘       │
//! │  └────────┬────────┘            ▼                     │                │
//! │           │            ┌─────────────────┐   ┌────────┴────────┐       │
//! │           └──────────► │ StockDecrement  │──►│ SaleLineResult  │       │
//! │                        └─────────────────┘   └────────┬────────┘       │
//! │                                                       ▼                │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  LowStockItem   │   │  DailySummary   │◄──│   LedgerRow     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - Products are identified by `code` (the sheet lookup key); `id` is carried along.
//! - Sales are identified by a generated [`SaleId`] shared by all of their ledger rows.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::SALE_ID_PREFIX;

// =============================================================================
// Product
// =============================================================================

/// A product row of the inventory sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identifier column of the sheet (free-form).
    pub id: String,

    /// Product code - unique lookup key.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Units currently in stock.
    pub quantity: i64,

    /// Unit price in cents.
    pub unit_price_cents: i64,

    /// Threshold at or below which the product is low on stock.
    pub min_stock: i64,

    /// Last time a sale touched this row, if ever.
    #[ts(as = "Option<String>")]
    pub last_updated: Option<NaiveDateTime>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Checks whether the product is at or below its minimum stock.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    /// Checks if `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line of a sale request.
///
/// Accepts the field names of the older web frontend
/// (`codigo`, `cantidad_vendida`) as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(alias = "codigo")]
    pub code: String,

    #[serde(alias = "cantidad_vendida", alias = "quantity_sold")]
    pub quantity_sold: i64,
}

impl CartItem {
    /// Creates a cart line.
    pub fn new(code: impl Into<String>, quantity_sold: i64) -> Self {
        CartItem {
            code: code.into(),
            quantity_sold,
        }
    }
}

// =============================================================================
// Stock Decrement
// =============================================================================

/// Outcome of a successful stock decrement on one inventory row.
///
/// ## Invariant
/// `new_quantity == previous_quantity - quantity_sold` and
/// `previous_quantity >= quantity_sold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockDecrement {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub min_stock: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    /// `new_quantity <= min_stock`.
    pub low_stock_alert: bool,
}

impl StockDecrement {
    /// Units removed by this decrement.
    #[inline]
    pub fn quantity_sold(&self) -> i64 {
        self.previous_quantity - self.new_quantity
    }
}

// =============================================================================
// Sale Line Result
// =============================================================================

/// A processed cart line, frozen at the moment its stock was decremented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineResult {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity_sold: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub low_stock_alert: bool,
}

impl SaleLineResult {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line subtotal (unit price × quantity sold).
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity_sold)
    }
}

impl From<StockDecrement> for SaleLineResult {
    fn from(d: StockDecrement) -> Self {
        SaleLineResult {
            quantity_sold: d.quantity_sold(),
            product_id: d.product_id,
            code: d.code,
            name: d.name,
            unit_price_cents: d.unit_price_cents,
            previous_quantity: d.previous_quantity,
            new_quantity: d.new_quantity,
            low_stock_alert: d.low_stock_alert,
        }
    }
}

// =============================================================================
// Sale Alert
// =============================================================================

/// Low-stock notice raised by a sale line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleAlert {
    pub product_name: String,
    pub remaining_quantity: i64,
}

impl SaleAlert {
    /// Builds the alert for a line, if the line crossed its threshold.
    pub fn for_line(line: &SaleLineResult) -> Option<Self> {
        line.low_stock_alert.then(|| SaleAlert {
            product_name: line.name.clone(),
            remaining_quantity: line.new_quantity,
        })
    }
}

// =============================================================================
// Sale Id
// =============================================================================

/// Sale identifier in the form `VTA-<YYYYMMDD>-<8 hex chars>`.
///
/// ## Uniqueness
/// The suffix is the first 8 hex digits of a v4 UUID: 32 random bits per
/// day. Collisions are improbable, not impossible; nothing checks the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct SaleId(String);

impl SaleId {
    /// Generates a fresh sale identifier for the given business date.
    pub fn generate(date: NaiveDate) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        SaleId(format!(
            "{}-{}-{}",
            SALE_ID_PREFIX,
            date.format("%Y%m%d"),
            &random[..8]
        ))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks that `s` has the `VTA-YYYYMMDD-xxxxxxxx` shape.
    pub fn is_well_formed(s: &str) -> bool {
        let mut parts = s.split('-');
        let (Some(prefix), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        prefix == SALE_ID_PREFIX
            && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
            && date.len() == 8
            && suffix.len() == 8
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SaleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Sale Result
// =============================================================================

/// Result of a fully committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleResult {
    pub sale_id: SaleId,
    /// Σ(unit price × quantity sold) over `lines`.
    pub total_cents: i64,
    pub item_count: usize,
    pub lines: Vec<SaleLineResult>,
    pub alerts: Vec<SaleAlert>,
}

impl SaleResult {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Ledger Row
// =============================================================================

/// One row of the sales ledger sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub sale_id: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM:SS`.
    pub time: String,
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
    /// Total of the whole sale, repeated on each of its rows.
    pub total_cents: i64,
    pub vendor: String,
}

impl LedgerRow {
    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Daily Summary
// =============================================================================

/// Aggregated sales of one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: String,
    /// Number of distinct sale ids.
    pub total_sales: usize,
    /// Σ subtotal of the day's rows.
    pub total_amount_cents: i64,
    /// Σ quantity of the day's rows.
    pub items_sold: i64,
    pub sales: Vec<LedgerRow>,
}

impl DailySummary {
    /// Zeroed summary for a day without sales.
    pub fn empty(date: impl Into<String>) -> Self {
        DailySummary {
            date: date.into(),
            total_sales: 0,
            total_amount_cents: 0,
            items_sold: 0,
            sales: Vec::new(),
        }
    }

    /// Aggregates the rows of `date` out of `rows`; rows of other days are ignored.
    ///
    /// Returns `None` when the day's amount or item count does not fit in an `i64`.
    pub fn from_rows(date: &str, rows: impl IntoIterator<Item = LedgerRow>) -> Option<Self> {
        let sales: Vec<LedgerRow> = rows.into_iter().filter(|r| r.date == date).collect();

        let unique: HashSet<&str> = sales.iter().map(|r| r.sale_id.as_str()).collect();
        let total_amount = Money::checked_sum(sales.iter().map(LedgerRow::subtotal))?;
        let items_sold = sales
            .iter()
            .try_fold(0i64, |sum, r| sum.checked_add(r.quantity))?;

        Some(DailySummary {
            date: date.to_string(),
            total_sales: unique.len(),
            total_amount_cents: total_amount.cents(),
            items_sold,
            sales,
        })
    }

    /// Returns the total amount as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Low Stock Item
// =============================================================================

/// A product at or below its minimum stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub min_stock: i64,
}

impl From<&Product> for LowStockItem {
    fn from(p: &Product) -> Self {
        LowStockItem {
            code: p.code.clone(),
            name: p.name.clone(),
            quantity: p.quantity,
            min_stock: p.min_stock,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_row(sale_id: &str, date: &str, quantity: i64, subtotal_cents: i64) -> LedgerRow {
        LedgerRow {
            sale_id: sale_id.to_string(),
            date: date.to_string(),
            time: "10:00:00".to_string(),
            product_id: "1".to_string(),
            code: "CAM001".to_string(),
            name: "Camisa".to_string(),
            quantity,
            unit_price_cents: subtotal_cents / quantity.max(1),
            subtotal_cents,
            total_cents: subtotal_cents,
            vendor: "Ana".to_string(),
        }
    }

    #[test]
    fn test_sale_id_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let id = SaleId::generate(date);

        assert!(id.as_str().starts_with("VTA-20240307-"));
        assert_eq!(id.as_str().len(), "VTA-20240307-".len() + 8);
        assert!(SaleId::is_well_formed(id.as_str()));
    }

    #[test]
    fn test_sale_ids_differ() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_ne!(SaleId::generate(date), SaleId::generate(date));
    }

    #[test]
    fn test_sale_id_well_formed_rejects() {
        assert!(!SaleId::is_well_formed("VTA-20240307"));
        assert!(!SaleId::is_well_formed("ABC-20240307-0123abcd"));
        assert!(!SaleId::is_well_formed("VTA-20241307-0123abcd"));
        assert!(!SaleId::is_well_formed("VTA-20240307-0123ABCD"));
        assert!(!SaleId::is_well_formed("VTA-20240307-0123abcd-x"));
    }

    #[test]
    fn test_line_from_decrement() {
        let line: SaleLineResult = StockDecrement {
            product_id: "1".to_string(),
            code: "CAM001".to_string(),
            name: "Camisa".to_string(),
            unit_price_cents: 500,
            min_stock: 3,
            previous_quantity: 10,
            new_quantity: 2,
            low_stock_alert: true,
        }
        .into();

        assert_eq!(line.quantity_sold, 8);
        assert_eq!(line.subtotal().cents(), 4000);
        assert_eq!(
            SaleAlert::for_line(&line),
            Some(SaleAlert {
                product_name: "Camisa".to_string(),
                remaining_quantity: 2
            })
        );
    }

    #[test]
    fn test_no_alert_above_threshold() {
        let mut line: SaleLineResult = StockDecrement {
            product_id: "1".to_string(),
            code: "CAM001".to_string(),
            name: "Camisa".to_string(),
            unit_price_cents: 500,
            min_stock: 3,
            previous_quantity: 10,
            new_quantity: 8,
            low_stock_alert: false,
        }
        .into();
        assert!(SaleAlert::for_line(&line).is_none());

        line.low_stock_alert = true;
        assert!(SaleAlert::for_line(&line).is_some());
    }

    #[test]
    fn test_daily_summary_aggregates_unique_sales() {
        let rows = vec![
            ledger_row("VTA-20240307-aaaaaaaa", "2024-03-07", 2, 1000),
            ledger_row("VTA-20240307-aaaaaaaa", "2024-03-07", 1, 350),
            ledger_row("VTA-20240307-bbbbbbbb", "2024-03-07", 4, 2000),
            ledger_row("VTA-20240308-cccccccc", "2024-03-08", 9, 9000),
        ];

        let summary = DailySummary::from_rows("2024-03-07", rows).unwrap();

        assert_eq!(summary.total_sales, 2);
        assert_eq!(summary.items_sold, 7);
        assert_eq!(summary.total_amount_cents, 3350);
        assert_eq!(summary.sales.len(), 3);
    }

    #[test]
    fn test_daily_summary_zeroed_when_no_rows_match() {
        let rows = vec![ledger_row("VTA-20240308-cccccccc", "2024-03-08", 9, 9000)];
        let summary = DailySummary::from_rows("2024-03-07", rows).unwrap();

        assert_eq!(summary, DailySummary::empty("2024-03-07"));
    }

    #[test]
    fn test_daily_summary_overflow_is_none() {
        let amount = vec![
            ledger_row("VTA-20240307-aaaaaaaa", "2024-03-07", 1, i64::MAX),
            ledger_row("VTA-20240307-bbbbbbbb", "2024-03-07", 1, 1),
        ];
        assert_eq!(DailySummary::from_rows("2024-03-07", amount), None);

        let items = vec![
            ledger_row("VTA-20240307-aaaaaaaa", "2024-03-07", i64::MAX, 100),
            ledger_row("VTA-20240307-bbbbbbbb", "2024-03-07", 1, 100),
        ];
        assert_eq!(DailySummary::from_rows("2024-03-07", items), None);

        // other days never enter the sums
        let other_day = vec![
            ledger_row("VTA-20240307-aaaaaaaa", "2024-03-07", 1, 100),
            ledger_row("VTA-20240308-bbbbbbbb", "2024-03-08", 1, i64::MAX),
            ledger_row("VTA-20240308-cccccccc", "2024-03-08", 1, i64::MAX),
        ];
        assert!(DailySummary::from_rows("2024-03-07", other_day).is_some());
    }

    #[test]
    fn test_cart_item_accepts_legacy_field_names() {
        let item: CartItem =
            serde_json::from_str(r#"{"codigo":"CAM001","cantidad_vendida":2}"#).unwrap();
        assert_eq!(item, CartItem::new("CAM001", 2));

        let item: CartItem =
            serde_json::from_str(r#"{"code":"PAN001","quantitySold":1}"#).unwrap();
        assert_eq!(item, CartItem::new("PAN001", 1));
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product {
            id: "1".to_string(),
            code: "CAM001".to_string(),
            name: "Camisa".to_string(),
            quantity: 10,
            unit_price_cents: 500,
            min_stock: 3,
            last_updated: None,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["unitPriceCents"], 500);
        assert_eq!(json["minStock"], 3);
        assert!(!product.is_low_stock());
        assert!(product.can_sell(10));
        assert!(!product.can_sell(11));
    }
}
