//! # Reporting Queries
//!
//! Read-only views over the ledger and inventory.
//!
//! ## Degraded Results
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bad input (malformed date)   → Err(ValidationError)                   │
//! │  Store read fails             → Ok(Report { data: empty,               │
//! │  or totals overflow                         degraded: Some(reason) })  │
//! │  Store read succeeds          → Ok(Report { data, degraded: None })    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A report screen keeps working when the store is briefly unreachable,
//! but the caller can still tell "no sales" from "could not look".

use chrono::Local;
use serde::Serialize;
use std::fmt;
use stockbook_core::validation::{validate_date, validate_optional_date, ValidationResult};
use stockbook_core::{DailySummary, LedgerRow, LowStockItem, DATE_FORMAT};
use tracing::{debug, warn};

use crate::repository::inventory::InventoryRepository;
use crate::repository::ledger::SaleLedger;
use crate::store::RecordStore;

/// Report payload plus the reason it is empty, if the store failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl<T> Report<T> {
    fn complete(data: T) -> Self {
        Report {
            data,
            degraded: None,
        }
    }

    fn degraded(data: T, reason: impl fmt::Display) -> Self {
        Report {
            data,
            degraded: Some(reason.to_string()),
        }
    }

    /// Whether the store failed and `data` is a placeholder.
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Sales history, daily summaries and low-stock alerts.
#[derive(Debug, Clone)]
pub struct ReportQueries<S> {
    inventory: InventoryRepository<S>,
    ledger: SaleLedger<S>,
}

impl<S: RecordStore> ReportQueries<S> {
    /// Creates report queries over `store`.
    pub fn new(store: S) -> Self {
        ReportQueries {
            inventory: InventoryRepository::new(store.clone()),
            ledger: SaleLedger::new(store),
        }
    }

    /// Ledger rows between two dates (inclusive), most recent `limit` rows.
    pub async fn sales_history(
        &self,
        limit: Option<usize>,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> ValidationResult<Report<Vec<LedgerRow>>> {
        validate_optional_date("date_from", date_from)?;
        validate_optional_date("date_to", date_to)?;

        Ok(match self.ledger.query(date_from, date_to, limit).await {
            Ok(rows) => {
                debug!(rows = rows.len(), "Sales history loaded");
                Report::complete(rows)
            }
            Err(e) => {
                warn!(error = %e, "Sales history unavailable");
                Report::degraded(Vec::new(), &e)
            }
        })
    }

    /// Totals of one day; today (local time) when `date` is `None`.
    pub async fn daily_summary(&self, date: Option<&str>) -> ValidationResult<Report<DailySummary>> {
        let date = match date {
            Some(date) => {
                validate_date("date", date)?;
                date.to_string()
            }
            None => Local::now().format(DATE_FORMAT).to_string(),
        };

        Ok(match self.ledger.query(Some(&date), Some(&date), None).await {
            Ok(rows) => match DailySummary::from_rows(&date, rows) {
                Some(summary) => {
                    debug!(
                        date = %date,
                        sales = summary.total_sales,
                        amount = %summary.total_amount(),
                        "Daily summary computed"
                    );
                    Report::complete(summary)
                }
                None => {
                    warn!(date = %date, "Daily totals overflow");
                    let reason = format!("Totals of {date} are too large to add up");
                    Report::degraded(DailySummary::empty(date), reason)
                }
            },
            Err(e) => {
                warn!(date = %date, error = %e, "Daily summary unavailable");
                Report::degraded(DailySummary::empty(date), &e)
            }
        })
    }

    /// Every product at or below its minimum stock, in sheet order.
    pub async fn low_stock_alerts(&self) -> Report<Vec<LowStockItem>> {
        match self.inventory.get_all().await {
            Ok(products) => Report::complete(
                products
                    .iter()
                    .filter(|p| p.is_low_stock())
                    .map(LowStockItem::from)
                    .collect(),
            ),
            Err(e) => {
                warn!(error = %e, "Low stock alerts unavailable");
                Report::degraded(Vec::new(), &e)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
