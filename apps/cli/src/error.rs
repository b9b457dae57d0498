//! # API Error Type
//!
//! What a failed command prints inside its JSON envelope.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError / CoreError::Validation     → VALIDATION_ERROR        │
//! │  CoreError::ProductNotFound                  → NOT_FOUND               │
//! │  CoreError::InsufficientStock                → INSUFFICIENT_STOCK      │
//! │  CoreError::AmountOverflow                   → VALIDATION_ERROR        │
//! │  DbError (any store failure)                 → PERSISTENCE_ERROR       │
//! │  SaleError::LedgerWriteFailed                → PERSISTENCE_ERROR       │
//! │  everything else                             → INTERNAL                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```json
//! { "code": "INSUFFICIENT_STOCK",
//!   "message": "Error in CAM001: Insufficient stock for CAM001: available 3, requested 5 (0 earlier line(s) already decremented)" }
//! ```

use serde::Serialize;
use stockbook_core::{CoreError, ValidationError};
use stockbook_db::{DbError, SaleError, StockError};

/// Error returned by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown product code
    NotFound,

    /// Malformed request; nothing was touched
    ValidationError,

    /// A cart line asked for more than is in stock
    InsufficientStock,

    /// The backing store failed or holds unreadable data
    PersistenceError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(core_error_code(&err), err.to_string())
    }
}

/// Converts store errors to API errors.
///
/// The message is kept: an operator reading it has to find the broken
/// cell or the unreachable workbook.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "Store operation failed");
        ApiError::new(ErrorCode::PersistenceError, err.to_string())
    }
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Core(e) => e.into(),
            StockError::Db(e) => e.into(),
        }
    }
}

impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        let code = match &err {
            SaleError::Validation(_) => ErrorCode::ValidationError,
            SaleError::LineRejected { source, .. } => stock_error_code(source),
            SaleError::LedgerWriteFailed { .. } => ErrorCode::PersistenceError,
        };

        if code == ErrorCode::PersistenceError {
            tracing::error!(
                error = %err,
                decremented = err.applied().len(),
                "Sale failed after touching the store"
            );
        }

        ApiError::new(code, err.to_string())
    }
}

fn core_error_code(err: &CoreError) -> ErrorCode {
    match err {
        CoreError::ProductNotFound(_) => ErrorCode::NotFound,
        CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
        CoreError::Validation(_) | CoreError::AmountOverflow(_) => ErrorCode::ValidationError,
    }
}

fn stock_error_code(err: &StockError) -> ErrorCode {
    match err {
        StockError::Core(e) => core_error_code(e),
        StockError::Db(_) => ErrorCode::PersistenceError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockbook_core::{Money, SaleId};

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::not_found("Product", "CAM009");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: CAM009");
    }

    #[test]
    fn test_line_rejections_keep_their_cause() {
        let insufficient = SaleError::LineRejected {
            line: 1,
            code: "CAM001".to_string(),
            applied: Vec::new(),
            source: CoreError::InsufficientStock {
                code: "CAM001".to_string(),
                available: 3,
                requested: 5,
            }
            .into(),
        };
        assert_eq!(ApiError::from(insufficient).code, ErrorCode::InsufficientStock);

        let missing = SaleError::LineRejected {
            line: 2,
            code: "PAN009".to_string(),
            applied: Vec::new(),
            source: CoreError::ProductNotFound("PAN009".to_string()).into(),
        };
        let err = ApiError::from(missing);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.starts_with("Error in PAN009"));

        let store_down = SaleError::LineRejected {
            line: 1,
            code: "CAM001".to_string(),
            applied: Vec::new(),
            source: DbError::persistence("timeout").into(),
        };
        assert_eq!(ApiError::from(store_down).code, ErrorCode::PersistenceError);
    }

    #[test]
    fn test_ledger_failure_is_persistence_error() {
        let err = ApiError::from(SaleError::LedgerWriteFailed {
            sale_id: SaleId::generate(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()),
            total: Money::from_cents(4000),
            applied: Vec::new(),
            source: DbError::persistence("quota exceeded"),
        });

        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(err.message.contains("stock decremented"));
    }

    #[test]
    fn test_validation_errors() {
        let err = ApiError::from(SaleError::Validation(ValidationError::Required {
            field: "cart".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Invalid sale request: cart is required");

        let err = ApiError::from(StockError::from(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
