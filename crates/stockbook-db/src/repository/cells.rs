//! Cell text ⇄ typed values.

use chrono::NaiveDateTime;
use stockbook_core::{Money, TIMESTAMP_FORMAT};
use tracing::warn;

use crate::error::{DbError, DbResult};
use crate::store::{Record, Sheet, HEADER_ROW};

/// Where a cell came from, for error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellAt {
    pub sheet: Sheet,
    pub row: u32,
}

impl CellAt {
    pub fn new(sheet: Sheet, row: u32) -> Self {
        CellAt { sheet, row }
    }

    fn invalid(self, column: &str, value: &str, reason: impl Into<String>) -> DbError {
        DbError::InvalidCell {
            sheet: self.sheet.title().to_string(),
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whole number cell (`"10"`).
    pub fn int(self, column: &str, value: &str) -> DbResult<i64> {
        value
            .trim()
            .parse()
            .map_err(|_| self.invalid(column, value, "expected a whole number"))
    }

    /// Whole number cell that must not be negative (stock, thresholds, units sold).
    pub fn count(self, column: &str, value: &str) -> DbResult<i64> {
        let count = self.int(column, value)?;
        if count < 0 {
            return Err(self.invalid(column, value, "must not be negative"));
        }
        Ok(count)
    }

    /// Decimal price cell (`"5"`, `"5.5"`, `"5.00"`). Negative amounts are rejected.
    pub fn money(self, column: &str, value: &str) -> DbResult<Money> {
        let amount =
            Money::parse_decimal(value).map_err(|e| self.invalid(column, value, e.to_string()))?;
        if amount.cents() < 0 {
            return Err(self.invalid(column, value, "must not be negative"));
        }
        Ok(amount)
    }

    /// `price × quantity` for the price held in this row's `column`.
    pub fn subtotal(self, column: &str, price: Money, quantity: i64) -> DbResult<Money> {
        price.checked_multiply_quantity(quantity).ok_or_else(|| {
            self.invalid(
                column,
                &price.to_decimal_string(),
                format!("subtotal of {quantity} unit(s) is too large"),
            )
        })
    }

    /// Timestamp cell; blank or unreadable stamps count as absent.
    pub fn timestamp(self, column: &str, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
            Ok(stamp) => Some(stamp),
            Err(_) => {
                warn!(sheet = %self.sheet, row = self.row, column, value, "Ignoring unreadable timestamp");
                None
            }
        }
    }
}

/// Sheet row number of the `index`-th record returned by `list_records`
/// (exact as long as the sheet has no blank rows).
pub(crate) fn data_row_number(index: usize) -> u32 {
    HEADER_ROW + 1 + index as u32
}

/// Value of `header` in a record, `""` when the column is missing.
pub(crate) fn field<'a>(record: &'a Record, header: &str) -> &'a str {
    record.get(header).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_and_money_cells() {
        let at = CellAt::new(Sheet::Inventory, 4);

        assert_eq!(at.int("quantity", " 12 ").unwrap(), 12);
        assert_eq!(at.money("unitPrice", "5.5").unwrap().cents(), 550);

        match at.int("quantity", "doce") {
            Err(DbError::InvalidCell { sheet, row, column, value, .. }) => {
                assert_eq!(sheet, "Inventory");
                assert_eq!(row, 4);
                assert_eq!(column, "quantity");
                assert_eq!(value, "doce");
            }
            other => panic!("expected InvalidCell, got {other:?}"),
        }
        assert!(at.money("unitPrice", "5.005").is_err());
    }

    #[test]
    fn test_negative_cells_are_invalid() {
        let at = CellAt::new(Sheet::Inventory, 3);

        assert_eq!(at.count("quantity", "0").unwrap(), 0);
        assert_eq!(at.int("quantity", "-5").unwrap(), -5);
        assert_eq!(at.money("unitPrice", "0.00").unwrap(), Money::zero());

        for (column, value, result) in [
            ("quantity", "-5", at.count("quantity", "-5").map(|_| ())),
            ("minStock", "-1", at.count("minStock", "-1").map(|_| ())),
            ("unitPrice", "-5.00", at.money("unitPrice", "-5.00").map(|_| ())),
        ] {
            match result {
                Err(DbError::InvalidCell { column: c, value: v, reason, .. }) => {
                    assert_eq!(c, column);
                    assert_eq!(v, value);
                    assert_eq!(reason, "must not be negative");
                }
                other => panic!("expected InvalidCell for {column}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_subtotal_overflow_is_invalid() {
        let at = CellAt::new(Sheet::Inventory, 2);

        assert_eq!(
            at.subtotal("unitPrice", Money::from_cents(500), 8).unwrap(),
            Money::from_cents(4000)
        );
        assert!(matches!(
            at.subtotal("unitPrice", Money::from_cents(i64::MAX), 2),
            Err(DbError::InvalidCell { row: 2, .. })
        ));
    }

    #[test]
    fn test_timestamp_cells() {
        let at = CellAt::new(Sheet::Inventory, 2);
        assert!(at.timestamp("lastUpdated", "").is_none());
        assert!(at.timestamp("lastUpdated", "yesterday").is_none());
        assert!(at.timestamp("lastUpdated", "2024-03-07 10:15:00").is_some());
    }
}
