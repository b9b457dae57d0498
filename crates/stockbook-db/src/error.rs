//! # Store Error Types
//!
//! Error types for everything that round-trips to the record store.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend error (sqlx::Error, injected fault, bad cell text)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StockError ← DbError or a business rule (CoreError) per decrement     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleError ← Which line failed and what was already applied            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in CLI app) ← Serialized for the caller                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockbook_core::{CoreError, Money, SaleId, SaleLineResult, ValidationError};
use thiserror::Error;

// =============================================================================
// Db Error
// =============================================================================

/// Record store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A read, write or append against the backing store failed.
    ///
    /// ## When This Occurs
    /// - The store is unreachable or refused the request
    /// - An append was interrupted (a prefix may have been accepted)
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// A cell holds text that cannot be parsed into its column's type.
    ///
    /// ## When This Occurs
    /// - Someone typed `"abc"` into a quantity cell by hand
    /// - A price carries more than two decimals
    #[error("Invalid {column} in {sheet} row {row}: '{value}' ({reason})")]
    InvalidCell {
        sheet: String,
        row: u32,
        column: String,
        value: String,
        reason: String,
    },

    /// Store connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        DbError::Persistence(message.into())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// sqlx::Error::Database       → DbError::Persistence
/// sqlx::Error::Io             → DbError::Persistence
/// sqlx::Error::PoolTimedOut   → DbError::Persistence
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Database(db_err) => DbError::Persistence(db_err.message().to_string()),

            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => DbError::Persistence(err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Stock Error
// =============================================================================

/// Failure of a single stock decrement: either a business rule said no,
/// or the store could not be reached.
#[derive(Debug, Error)]
pub enum StockError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for StockError {
    fn from(err: ValidationError) -> Self {
        StockError::Core(CoreError::Validation(err))
    }
}

// =============================================================================
// Sale Error
// =============================================================================

/// Sale orchestration errors.
///
/// ## Partial Effects
/// ```text
/// Validation        → nothing was touched
/// LineRejected      → lines before `line` are decremented, no ledger row
///                     (an AmountOverflow source means `line` itself is too)
/// LedgerWriteFailed → every line is decremented, ledger may hold a prefix
/// ```
/// Decrements are never rolled back; `applied` lists what stuck so an
/// operator can reconcile by hand.
#[derive(Debug, Error)]
pub enum SaleError {
    /// The request was rejected before any mutation.
    #[error("Invalid sale request: {0}")]
    Validation(#[from] ValidationError),

    /// Cart line `line` (1-based) could not be decremented.
    #[error(
        "Error in {code}: {source} ({} earlier line(s) already decremented)",
        .applied.len()
    )]
    LineRejected {
        line: usize,
        code: String,
        applied: Vec<SaleLineResult>,
        source: StockError,
    },

    /// Stock was decremented for every line but the ledger append failed.
    #[error(
        "Sale {sale_id} ({total}) was processed and stock decremented for {} line(s), \
         but it was not recorded in the sales history: {source}",
        .applied.len()
    )]
    LedgerWriteFailed {
        sale_id: SaleId,
        total: Money,
        applied: Vec<SaleLineResult>,
        source: DbError,
    },
}

impl SaleError {
    /// Lines whose stock decrement already reached the store.
    pub fn applied(&self) -> &[SaleLineResult] {
        match self {
            SaleError::Validation(_) => &[],
            SaleError::LineRejected { applied, .. } | SaleError::LedgerWriteFailed { applied, .. } => {
                applied
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
