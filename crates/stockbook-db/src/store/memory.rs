//! # In-Memory Record Store
//!
//! Worksheets held in process, with switchable faults.
//!
//! ## Failure Injection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fail_reads(true)          find / read / list → DbError::Persistence   │
//! │  fail_writes(true)         write_cell         → DbError::Persistence   │
//! │  fail_appends_after(n)     append_rows keeps n more rows, then fails   │
//! │                            (n = 0 fails the whole append)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Faults stay armed until switched off. They are shared by every clone of
//! the handle, so a test can keep one clone and hand another to a repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{Record, RecordStore, RowRef, Sheet, SheetRow, HEADER_ROW};
use crate::error::{DbError, DbResult};

/// In-process workbook. Index 0 of each sheet is the header row.
#[derive(Debug)]
struct Workbook {
    sheets: HashMap<Sheet, Vec<SheetRow>>,
}

impl Workbook {
    fn new() -> Self {
        let sheets = Sheet::ALL
            .iter()
            .map(|&sheet| {
                let headers = sheet.headers().iter().map(|h| h.to_string()).collect();
                (sheet, vec![headers])
            })
            .collect();
        Workbook { sheets }
    }

    fn rows(&self, sheet: Sheet) -> &[SheetRow] {
        self.sheets.get(&sheet).map(Vec::as_slice).unwrap_or(&[])
    }

    fn rows_mut(&mut self, sheet: Sheet) -> &mut Vec<SheetRow> {
        self.sheets.entry(sheet).or_default()
    }
}

#[derive(Debug, Default)]
struct Faults {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// Rows the next appends may still accept before failing.
    append_budget: Mutex<Option<usize>>,
    append_calls: AtomicUsize,
}

/// In-memory [`RecordStore`] with failure injection.
///
/// ## Example
/// ```rust,ignore
/// let store = MemoryStore::new();
/// store.fail_appends_after(Some(1));
/// // the next append keeps its first row and fails on the second
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    workbook: Arc<Mutex<Workbook>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    /// Creates a workbook holding only the header rows.
    pub fn new() -> Self {
        MemoryStore {
            workbook: Arc::new(Mutex::new(Workbook::new())),
            faults: Arc::new(Faults::default()),
        }
    }

    /// Makes every read primitive fail.
    pub fn fail_reads(&self, on: bool) {
        self.faults.fail_reads.store(on, Ordering::SeqCst);
    }

    /// Makes `write_cell` fail.
    pub fn fail_writes(&self, on: bool) {
        self.faults.fail_writes.store(on, Ordering::SeqCst);
    }

    /// Lets appends accept `rows` more rows, then fail. `None` disarms.
    pub fn fail_appends_after(&self, rows: Option<usize>) {
        *lock(&self.faults.append_budget) = rows;
    }

    /// Number of `append_rows` calls seen so far, failed ones included.
    pub fn append_calls(&self) -> usize {
        self.faults.append_calls.load(Ordering::SeqCst)
    }

    /// Copy of the data rows of a sheet (header row excluded).
    pub fn data_rows(&self, sheet: Sheet) -> Vec<SheetRow> {
        self.workbook().rows(sheet).iter().skip(1).cloned().collect()
    }

    fn workbook(&self) -> MutexGuard<'_, Workbook> {
        lock(&self.workbook)
    }

    fn check_read(&self, op: &str, sheet: Sheet) -> DbResult<()> {
        if self.faults.fail_reads.load(Ordering::SeqCst) {
            return Err(DbError::persistence(format!(
                "injected read failure: {op} on {sheet}"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A panicking test must not wedge every later call on the same store.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn row_index(row: RowRef) -> DbResult<usize> {
    match row.number() {
        0 => Err(DbError::Internal("row numbers start at 1".to_string())),
        n => Ok(n as usize - 1),
    }
}

fn column_index(column: u32) -> DbResult<usize> {
    match column {
        0 => Err(DbError::Internal("column numbers start at 1".to_string())),
        n => Ok(n as usize - 1),
    }
}

impl RecordStore for MemoryStore {
    async fn find_row_by_key(&self, sheet: Sheet, key: &str) -> DbResult<Option<RowRef>> {
        self.check_read("find_row_by_key", sheet)?;
        let key_index = column_index(sheet.key_column())?;

        let workbook = self.workbook();
        let found = workbook
            .rows(sheet)
            .iter()
            .enumerate()
            .skip(HEADER_ROW as usize)
            .find(|(_, row)| row.get(key_index).is_some_and(|cell| cell == key))
            .map(|(index, _)| RowRef::new(index as u32 + 1));

        debug!(sheet = %sheet, key, row = ?found, "Key lookup");
        Ok(found)
    }

    async fn read_cell(&self, sheet: Sheet, row: RowRef, column: u32) -> DbResult<String> {
        self.check_read("read_cell", sheet)?;
        let (r, c) = (row_index(row)?, column_index(column)?);

        let workbook = self.workbook();
        Ok(workbook
            .rows(sheet)
            .get(r)
            .and_then(|cells| cells.get(c))
            .cloned()
            .unwrap_or_default())
    }

    async fn write_cell(&self, sheet: Sheet, row: RowRef, column: u32, value: &str) -> DbResult<()> {
        if self.faults.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::persistence(format!(
                "injected write failure: {sheet}!R{row}C{column}"
            )));
        }
        let (r, c) = (row_index(row)?, column_index(column)?);

        let mut workbook = self.workbook();
        let rows = workbook.rows_mut(sheet);
        if rows.len() <= r {
            rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut rows[r];
        if cells.len() <= c {
            cells.resize(c + 1, String::new());
        }
        cells[c] = value.to_string();

        debug!(sheet = %sheet, row = %row, column, "Cell written");
        Ok(())
    }

    async fn append_rows(&self, sheet: Sheet, rows: &[SheetRow]) -> DbResult<()> {
        self.faults.append_calls.fetch_add(1, Ordering::SeqCst);

        let accepted = {
            let mut budget = lock(&self.faults.append_budget);
            match budget.as_mut() {
                Some(left) => {
                    let accepted = rows.len().min(*left);
                    *left -= accepted;
                    accepted
                }
                None => rows.len(),
            }
        };

        self.workbook()
            .rows_mut(sheet)
            .extend(rows[..accepted].iter().cloned());

        if accepted < rows.len() {
            return Err(DbError::persistence(format!(
                "injected append failure on {sheet}: {accepted} of {} row(s) accepted",
                rows.len()
            )));
        }

        debug!(sheet = %sheet, rows = rows.len(), "Rows appended");
        Ok(())
    }

    async fn list_records(&self, sheet: Sheet) -> DbResult<Vec<Record>> {
        self.check_read("list_records", sheet)?;

        let workbook = self.workbook();
        let rows = workbook.rows(sheet);
        let Some((headers, data)) = rows.split_first() else {
            return Ok(Vec::new());
        };

        Ok(data
            .iter()
            .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
            .map(|cells| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| (header.clone(), cells.get(i).cloned().unwrap_or_default()))
                    .collect::<Record>()
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> SheetRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_append_then_find_and_read() {
        let store = MemoryStore::new();
        store
            .append_rows(
                Sheet::Inventory,
                &[
                    row(&["1", "CAM001", "Camisa", "10", "5.00", "3", ""]),
                    row(&["2", "PAN001", "Pantalon", "4", "12.50", "2", ""]),
                ],
            )
            .await
            .unwrap();

        let found = store.find_row_by_key(Sheet::Inventory, "PAN001").await.unwrap();
        assert_eq!(found, Some(RowRef::new(3)));

        let name = store.read_cell(Sheet::Inventory, RowRef::new(3), 3).await.unwrap();
        assert_eq!(name, "Pantalon");

        let missing = store.read_cell(Sheet::Inventory, RowRef::new(40), 3).await.unwrap();
        assert_eq!(missing, "");
    }

    #[tokio::test]
    async fn test_find_searches_key_column_only() {
        let store = MemoryStore::new();
        store
            .append_rows(
                Sheet::Inventory,
                &[row(&["CAM001", "X1", "CAM001", "1", "1", "0", ""])],
            )
            .await
            .unwrap();

        assert_eq!(store.find_row_by_key(Sheet::Inventory, "CAM001").await.unwrap(), None);
        assert_eq!(
            store.find_row_by_key(Sheet::Inventory, "X1").await.unwrap(),
            Some(RowRef::new(2))
        );
        assert_eq!(store.find_row_by_key(Sheet::Inventory, "code").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_cell_extends_row() {
        let store = MemoryStore::new();
        store
            .write_cell(Sheet::Sales, RowRef::new(2), 3, "10:00:00")
            .await
            .unwrap();

        assert_eq!(store.data_rows(Sheet::Sales), vec![row(&["", "", "10:00:00"])]);
    }

    #[tokio::test]
    async fn test_list_records_keys_by_header() {
        let store = MemoryStore::new();
        store
            .append_rows(
                Sheet::Inventory,
                &[row(&["1", "CAM001", "Camisa"]), row(&["", "", ""])],
            )
            .await
            .unwrap();

        let records = store.list_records(Sheet::Inventory).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["code"], "CAM001");
        assert_eq!(records[0]["minStock"], "");
    }

    #[tokio::test]
    async fn test_append_budget_keeps_prefix() {
        let store = MemoryStore::new();
        store.fail_appends_after(Some(1));

        let result = store
            .append_rows(Sheet::Sales, &[row(&["a"]), row(&["b"])])
            .await;

        assert!(matches!(result, Err(DbError::Persistence(_))));
        assert_eq!(store.data_rows(Sheet::Sales), vec![row(&["a"])]);
        assert_eq!(store.append_calls(), 1);
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let store = MemoryStore::new();
        let handle = store.clone();

        handle.fail_reads(true);
        assert!(store.list_records(Sheet::Inventory).await.is_err());
        assert!(store.find_row_by_key(Sheet::Inventory, "X").await.is_err());
        handle.fail_reads(false);
        assert!(store.list_records(Sheet::Inventory).await.is_ok());

        handle.fail_writes(true);
        assert!(store
            .write_cell(Sheet::Inventory, RowRef::new(2), 4, "1")
            .await
            .is_err());
    }
}
