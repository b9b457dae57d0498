//! # Sale Ledger
//!
//! Append-only sales history, one row per sold line.
//!
//! ## Row Shape
//! ```text
//! saleId                 date        time      productId code    name    quantity unitPrice subtotal total  vendor
//! VTA-20240307-3f9a1c2e  2024-03-07  10:15:00  1         CAM001  Camisa  8        5.00      40.00    52.50  Ana
//! VTA-20240307-3f9a1c2e  2024-03-07  10:15:00  2         PAN001  Pant.   1        12.50     12.50    52.50  Ana
//! ```
//! `total` is the whole sale's total, repeated on each of its rows.
//!
//! Rows are never updated or deleted.

use chrono::{Local, NaiveDateTime};
use stockbook_core::{LedgerRow, Money, SaleId, SaleLineResult, DATE_FORMAT, TIME_FORMAT};
use tracing::debug;

use super::cells::{data_row_number, field, CellAt};
use crate::error::DbResult;
use crate::store::{Record, RecordStore, SalesColumn, Sheet, SheetRow};

/// Repository for the sales ledger sheet.
#[derive(Debug, Clone)]
pub struct SaleLedger<S> {
    store: S,
}

impl<S: RecordStore> SaleLedger<S> {
    /// Creates a new SaleLedger.
    pub fn new(store: S) -> Self {
        SaleLedger { store }
    }

    /// Records a sale stamped with the current local time.
    pub async fn append(
        &self,
        sale_id: &SaleId,
        lines: &[SaleLineResult],
        total: Money,
        vendor: &str,
    ) -> DbResult<()> {
        self.append_at(sale_id, lines, total, vendor, Local::now().naive_local())
            .await
    }

    /// Records a sale as one row per line, all in a single append.
    ///
    /// An empty `lines` writes nothing. On failure the store may already
    /// hold a prefix of the rows; nothing cleans it up.
    pub async fn append_at(
        &self,
        sale_id: &SaleId,
        lines: &[SaleLineResult],
        total: Money,
        vendor: &str,
        at: NaiveDateTime,
    ) -> DbResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let date = at.format(DATE_FORMAT).to_string();
        let time = at.format(TIME_FORMAT).to_string();

        debug!(sale_id = %sale_id, rows = lines.len(), total = %total, "Appending sale");

        let rows: Vec<SheetRow> = lines
            .iter()
            .map(|line| ledger_row(sale_id, &date, &time, line, total, vendor))
            .collect();

        self.store.append_rows(Sheet::Sales, &rows).await
    }

    /// Ledger rows filtered by date, in store order.
    ///
    /// ## Filtering
    /// - `date_from` / `date_to` are inclusive and compared as strings, so
    ///   they must be zero-padded `YYYY-MM-DD` to mean what they say
    /// - `limit` keeps the LAST `limit` matching rows (the most recent ones);
    ///   `Some(0)` means no limit, like `None`
    /// - `date_from > date_to` yields an empty list
    pub async fn query(
        &self,
        date_from: Option<&str>,
        date_to: Option<&str>,
        limit: Option<usize>,
    ) -> DbResult<Vec<LedgerRow>> {
        debug!(?date_from, ?date_to, ?limit, "Querying ledger");

        let records = self.store.list_records(Sheet::Sales).await?;

        let mut rows = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let date = field(record, SalesColumn::Date.header());
            if date_from.is_some_and(|from| date < from) || date_to.is_some_and(|to| date > to) {
                continue;
            }
            let at = CellAt::new(Sheet::Sales, data_row_number(index));
            rows.push(ledger_row_from_record(at, record)?);
        }

        if let Some(limit) = limit.filter(|&limit| limit > 0) {
            let skip = rows.len().saturating_sub(limit);
            rows.drain(..skip);
        }

        Ok(rows)
    }
}

/// Cells of one ledger row, in column order.
fn ledger_row(
    sale_id: &SaleId,
    date: &str,
    time: &str,
    line: &SaleLineResult,
    total: Money,
    vendor: &str,
) -> SheetRow {
    vec![
        sale_id.to_string(),
        date.to_string(),
        time.to_string(),
        line.product_id.clone(),
        line.code.clone(),
        line.name.clone(),
        line.quantity_sold.to_string(),
        line.unit_price().to_decimal_string(),
        line.subtotal().to_decimal_string(),
        total.to_decimal_string(),
        vendor.to_string(),
    ]
}

fn ledger_row_from_record(at: CellAt, record: &Record) -> DbResult<LedgerRow> {
    let text = |column: SalesColumn| field(record, column.header()).trim().to_string();
    let cell = |column: SalesColumn| field(record, column.header());

    Ok(LedgerRow {
        sale_id: text(SalesColumn::SaleId),
        date: text(SalesColumn::Date),
        time: text(SalesColumn::Time),
        product_id: text(SalesColumn::ProductId),
        code: text(SalesColumn::Code),
        name: text(SalesColumn::Name),
        quantity: at.count("quantity", cell(SalesColumn::Quantity))?,
        unit_price_cents: at.money("unitPrice", cell(SalesColumn::UnitPrice))?.cents(),
        subtotal_cents: at.money("subtotal", cell(SalesColumn::Subtotal))?.cents(),
        total_cents: at.money("total", cell(SalesColumn::Total))?.cents(),
        vendor: text(SalesColumn::Vendor),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
