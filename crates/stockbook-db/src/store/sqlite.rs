//! # SQLite Record Store
//!
//! A workbook emulated as one SQLite table of text cells.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Worksheet Backend                           │
//! │                                                                         │
//! │  SqliteConfig::new(path) ← Configure pool settings                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::connect(config).await                                    │
//! │       │  1. open pool (WAL, NORMAL sync)                                │
//! │       │  2. run embedded migrations                                    │
//! │       │  3. write header rows if missing                               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  sheet_cells                                                    │   │
//! │  │  (sheet, row_num, col_num) → value                              │   │
//! │  │  ("Inventory", 1, 2) → "code"                                   │   │
//! │  │  ("Inventory", 2, 2) → "CAM001"                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Single-cell writes are single statements. `append_rows` runs in one
//! `BEGIN IMMEDIATE` transaction, so this backend never leaves a partial
//! append behind and concurrent appends (from this pool or another
//! process) queue on the write lock instead of picking the same rows.
//! Nothing spans two primitives: a read followed by a write can still be
//! interleaved with another writer.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{Record, RecordStore, RowRef, Sheet, SheetRow, HEADER_ROW};
use crate::error::{DbError, DbResult};
use crate::migrations;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// SQLite store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SqliteConfig::new("./stockbook.db")
///     .max_connections(5)
///     .connect_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration, also used as the SQLite busy timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections forever.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl SqliteConfig {
    /// Creates a configuration for the database file at `path`.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory configuration (tests, demos).
    ///
    /// Every SQLite connection to `:memory:` opens its own empty database,
    /// so the pool is pinned to a single connection that never idles out.
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// Whether this configuration targets an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }
}

// =============================================================================
// Store
// =============================================================================

/// [`RecordStore`] backed by a SQLite connection pool.
///
/// Cloning is cheap; every clone shares the pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the pool, applies migrations and writes missing header rows.
    ///
    /// ## Returns
    /// * `Ok(SqliteStore)` - Ready-to-use store handle
    /// * `Err(DbError)` - Connection, migration or header write failed
    pub async fn connect(config: SqliteConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening workbook"
        );

        let in_memory = config.is_in_memory();

        let connect_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .journal_mode(SqliteJournalMode::Memory)
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                // Readers don't block the writer
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        }
        .busy_timeout(config.connect_timeout);

        debug!("Connection options configured");

        let (max_connections, idle_timeout) = if in_memory {
            (1, None)
        } else {
            (config.max_connections, config.idle_timeout)
        };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(config.min_connections.min(max_connections))
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(idle_timeout);
        if in_memory {
            pool_options = pool_options.max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections, "Workbook pool created");

        let store = SqliteStore { pool };

        if config.run_migrations {
            store.run_migrations().await?;
        }
        store.ensure_headers().await?;

        Ok(store)
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running workbook migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Writes the header row of every sheet, leaving existing cells alone.
    pub async fn ensure_headers(&self) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for sheet in Sheet::ALL {
            for (index, header) in sheet.headers().iter().enumerate() {
                sqlx::query(
                    "INSERT OR IGNORE INTO sheet_cells (sheet, row_num, col_num, value) \
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(sheet.title())
                .bind(i64::from(HEADER_ROW))
                .bind(index as i64 + 1)
                .bind(*header)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!("Header rows in place");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool.
    ///
    /// After calling close, every store operation fails.
    pub async fn close(&self) {
        info!("Closing workbook pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl RecordStore for SqliteStore {
    async fn find_row_by_key(&self, sheet: Sheet, key: &str) -> DbResult<Option<RowRef>> {
        let row: Option<i64> = sqlx::query_scalar(
            "SELECT row_num FROM sheet_cells \
             WHERE sheet = ?1 AND col_num = ?2 AND value = ?3 AND row_num > ?4 \
             ORDER BY row_num LIMIT 1",
        )
        .bind(sheet.title())
        .bind(i64::from(sheet.key_column()))
        .bind(key)
        .bind(i64::from(HEADER_ROW))
        .fetch_optional(&self.pool)
        .await?;

        debug!(sheet = %sheet, key, row = ?row, "Key lookup");

        row.map(|r| {
            u32::try_from(r)
                .map(RowRef::new)
                .map_err(|_| DbError::Internal(format!("row number out of range: {r}")))
        })
        .transpose()
    }

    async fn read_cell(&self, sheet: Sheet, row: RowRef, column: u32) -> DbResult<String> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM sheet_cells WHERE sheet = ?1 AND row_num = ?2 AND col_num = ?3",
        )
        .bind(sheet.title())
        .bind(i64::from(row.number()))
        .bind(i64::from(column))
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.unwrap_or_default())
    }

    async fn write_cell(&self, sheet: Sheet, row: RowRef, column: u32, value: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sheet_cells (sheet, row_num, col_num, value) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (sheet, row_num, col_num) DO UPDATE SET value = excluded.value",
        )
        .bind(sheet.title())
        .bind(i64::from(row.number()))
        .bind(i64::from(column))
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(sheet = %sheet, row = %row, column, "Cell written");
        Ok(())
    }

    async fn append_rows(&self, sheet: Sheet, rows: &[SheetRow]) -> DbResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        // Take the write lock before reading MAX(row_num).
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let last_row: Option<i64> =
            sqlx::query_scalar("SELECT MAX(row_num) FROM sheet_cells WHERE sheet = ?1")
                .bind(sheet.title())
                .fetch_one(&mut *tx)
                .await?;
        let first_row = last_row.unwrap_or(i64::from(HEADER_ROW)) + 1;

        for (offset, cells) in rows.iter().enumerate() {
            let row_num = first_row + offset as i64;
            for (index, value) in cells.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO sheet_cells (sheet, row_num, col_num, value) \
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(sheet.title())
                .bind(row_num)
                .bind(index as i64 + 1)
                .bind(value.as_str())
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(sheet = %sheet, first_row, rows = rows.len(), "Rows appended");
        Ok(())
    }

    async fn list_records(&self, sheet: Sheet) -> DbResult<Vec<Record>> {
        let cells: Vec<(i64, i64, String)> = sqlx::query_as(
            "SELECT row_num, col_num, value FROM sheet_cells \
             WHERE sheet = ?1 ORDER BY row_num, col_num",
        )
        .bind(sheet.title())
        .fetch_all(&self.pool)
        .await?;

        // Header row sorts first, so headers are known before any data cell.
        let mut headers: BTreeMap<i64, String> = BTreeMap::new();
        let mut rows: BTreeMap<i64, Record> = BTreeMap::new();

        for (row_num, col_num, value) in cells {
            if row_num == i64::from(HEADER_ROW) {
                headers.insert(col_num, value);
            } else if let Some(header) = headers.get(&col_num) {
                rows.entry(row_num).or_default().insert(header.clone(), value);
            }
        }

        Ok(rows
            .into_values()
            .filter(|record| record.values().any(|v| !v.is_empty()))
            .map(|mut record| {
                for header in headers.values() {
                    record.entry(header.clone()).or_default();
                }
                record
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
