//! # Validation Module
//!
//! Input validation for Stockbook requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command layer                                                │
//! │  ├── Argument / JSON body parsing                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Cart shape, codes, quantities, vendor                             │
//! │  └── Report dates (YYYY-MM-DD)                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Sale core (stockbook-db)                                     │
//! │  └── Stock availability, product existence                             │
//! │                                                                         │
//! │  Everything here runs BEFORE the first store mutation.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::CartItem;
use crate::{DATE_FORMAT, MAX_CART_ITEMS, MAX_VENDOR_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// The only rule is that the code is not blank. Whatever text the
/// inventory sheet holds in its key column is a sellable code.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_code;
///
/// assert!(validate_code("CAM001").is_ok());
/// assert!(validate_code("CAM 001").is_ok());
/// assert!(validate_code("   ").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    Ok(())
}

/// Normalizes a vendor name.
///
/// Blank or missing names fall back to `default_vendor`.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::normalize_vendor;
///
/// assert_eq!(normalize_vendor(Some("  Ana "), "Sistema").unwrap(), "Ana");
/// assert_eq!(normalize_vendor(None, "Sistema").unwrap(), "Sistema");
/// ```
pub fn normalize_vendor(vendor: Option<&str>, default_vendor: &str) -> ValidationResult<String> {
    let vendor = vendor.map(str::trim).filter(|v| !v.is_empty());

    match vendor {
        Some(v) if v.chars().count() > MAX_VENDOR_LEN => Err(ValidationError::TooLong {
            field: "vendor".to_string(),
            max: MAX_VENDOR_LEN,
        }),
        Some(v) => Ok(v.to_string()),
        None => Ok(default_vendor.to_string()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// Must be positive. There is no upper cap; asking for more than is in
/// stock is a stock error, not a validation error.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a whole cart before any stock is touched and returns it with
/// every code trimmed.
///
/// ## Rules
/// - At least one line (an empty cart is rejected, never a silent no-op)
/// - At most MAX_CART_ITEMS (100) lines
/// - Every code non-blank, every quantity positive
///
/// Repeated codes are allowed; each line is decremented on its own.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST sale { cart, vendor }                                             │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  normalize_cart(cart) ← THIS FUNCTION                                   │
/// │       │                                                                 │
/// │       ├── empty? → Error: "cart is required"                            │
/// │       ├── bad code / quantity? → Error naming the field                 │
/// │       │                                                                 │
/// │       └── OK → decrement stock line by line                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn normalize_cart(cart: &[CartItem]) -> ValidationResult<Vec<CartItem>> {
    if cart.is_empty() {
        return Err(ValidationError::Required {
            field: "cart".to_string(),
        });
    }

    if cart.len() > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    cart.iter()
        .map(|item| {
            validate_code(&item.code)?;
            validate_quantity(item.quantity_sold)?;
            Ok(CartItem::new(item.code.trim(), item.quantity_sold))
        })
        .collect()
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates a `YYYY-MM-DD` date used by reports.
///
/// The ledger compares dates as strings, which only orders correctly for
/// zero-padded ISO dates, so `2024-3-7` is rejected even though it is a
/// real day.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_date;
///
/// assert!(validate_date("date", "2024-03-07").is_ok());
/// assert!(validate_date("date", "2024-3-7").is_err());
/// assert!(validate_date("date", "2024-02-30").is_err());
/// ```
pub fn validate_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let invalid = || ValidationError::invalid_format(field, "expected a YYYY-MM-DD date");

    if value.len() != 10 {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Validates an optional date, passing `None` through.
pub fn validate_optional_date(field: &str, value: Option<&str>) -> ValidationResult<()> {
    if let Some(value) = value {
        validate_date(field, value)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("CAM001").is_ok());
        assert!(validate_code("CAM 001").is_ok());
        assert!(validate_code("TOR/12.5").is_ok());
        assert!(validate_code(&"A".repeat(200)).is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(i64::MAX).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_normalize_cart_rejects_empty() {
        assert_eq!(
            normalize_cart(&[]),
            Err(ValidationError::Required {
                field: "cart".to_string()
            })
        );
    }

    #[test]
    fn test_normalize_cart_lines() {
        assert!(normalize_cart(&[CartItem::new("CAM001", 2), CartItem::new("CAM001", 1)]).is_ok());
        assert!(normalize_cart(&[CartItem::new("CAM001", 2), CartItem::new("", 1)]).is_err());
        assert!(normalize_cart(&[CartItem::new("CAM001", 0)]).is_err());
    }

    #[test]
    fn test_normalize_cart_trims_codes() {
        let cart = normalize_cart(&[CartItem::new(" CAM001 ", 2), CartItem::new("CAM 001", 1)])
            .unwrap();
        assert_eq!(
            cart,
            vec![CartItem::new("CAM001", 2), CartItem::new("CAM 001", 1)]
        );
    }

    #[test]
    fn test_normalize_cart_size() {
        let cart: Vec<CartItem> = (0..=MAX_CART_ITEMS)
            .map(|i| CartItem::new(format!("P{i}"), 1))
            .collect();
        assert!(normalize_cart(&cart).is_err());
        assert!(normalize_cart(&cart[..MAX_CART_ITEMS]).is_ok());
    }

    #[test]
    fn test_normalize_vendor() {
        assert_eq!(normalize_vendor(Some("Ana"), "Sistema").unwrap(), "Ana");
        assert_eq!(normalize_vendor(Some("   "), "Sistema").unwrap(), "Sistema");
        assert_eq!(normalize_vendor(None, "Caja 1").unwrap(), "Caja 1");
        assert!(normalize_vendor(Some(&"x".repeat(101)), "Sistema").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(
            validate_date("date", "2024-03-07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
        assert!(validate_date("date", "").is_err());
        assert!(validate_date("date", "07/03/2024").is_err());
        assert!(validate_date("date", "2024-3-07").is_err());
        assert!(validate_date("date", "2024-13-01").is_err());

        assert!(validate_optional_date("date_to", None).is_ok());
        assert!(validate_optional_date("date_to", Some("nope")).is_err());
    }
}
