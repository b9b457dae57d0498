//! Reporting commands. Read failures come back as degraded reports, not
//! errors; only malformed dates fail.

use stockbook_core::{DailySummary, LedgerRow, LowStockItem};
use stockbook_db::{Backend, RecordStore, Report};
use tracing::debug;

use crate::error::ApiError;

/// Ledger rows, optionally bounded by date and trimmed to the last `limit`.
pub async fn sales_history<S: RecordStore>(
    backend: &Backend<S>,
    limit: Option<usize>,
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> Result<Report<Vec<LedgerRow>>, ApiError> {
    debug!(?limit, ?date_from, ?date_to, "sales_history called");
    Ok(backend
        .reports()
        .sales_history(limit, date_from, date_to)
        .await?)
}

/// Totals of `date`, or of today.
pub async fn daily_summary<S: RecordStore>(
    backend: &Backend<S>,
    date: Option<&str>,
) -> Result<Report<DailySummary>, ApiError> {
    debug!(?date, "daily_summary called");
    Ok(backend.reports().daily_summary(date).await?)
}

pub async fn low_stock_alerts<S: RecordStore>(backend: &Backend<S>) -> Report<Vec<LowStockItem>> {
    backend.reports().low_stock_alerts().await
}
