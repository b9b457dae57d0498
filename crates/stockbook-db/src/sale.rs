//! # Sale Processor
//!
//! Turns a cart into stock decrements plus one ledger append.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_sale(cart, vendor)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate cart (trim codes) + vendor ► SaleError::Validation           │
//! │       │                                (nothing touched)               │
//! │       ▼                                                                 │
//! │  [demand precheck, if enabled] ──────► SaleError::LineRejected         │
//! │       │                                (nothing touched)               │
//! │       ▼                                                                 │
//! │  sale_id = VTA-YYYYMMDD-xxxxxxxx                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each line, in order:                                              │
//! │     decrement_stock(code, qty) ──────► SaleError::LineRejected         │
//! │     total += price × qty               (earlier lines stay decremented)│
//! │     alert if new ≤ minStock                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledger.append(sale_id, lines) ──────► SaleError::LedgerWriteFailed    │
//! │       │                                (all lines decremented)         │
//! │       ▼                                                                 │
//! │  SaleResult { sale_id, total, item_count, lines, alerts }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Rollback
//! The store has no multi-row transactions and nothing here compensates.
//! A failure after the first decrement leaves stock changed; the error
//! carries the applied lines so the caller can report them.
//!
//! ## Repeated Codes
//! A code listed twice is decremented twice, each time against the stock
//! left by the previous line. Without the precheck, the second line can
//! fail after the first one already took stock.

use chrono::{Local, NaiveDateTime};
use stockbook_core::validation::{normalize_cart, normalize_vendor};
use stockbook_core::{
    CartItem, CoreError, Money, SaleAlert, SaleId, SaleLineResult, SaleResult, DEFAULT_VENDOR,
};
use tracing::{debug, info, warn};

use crate::error::{SaleError, StockError};
use crate::repository::inventory::InventoryRepository;
use crate::repository::ledger::SaleLedger;
use crate::store::RecordStore;

/// Executes sales against a record store.
///
/// ## Usage
/// ```rust,ignore
/// let sales = SaleProcessor::new(store)
///     .with_default_vendor("Caja 1")
///     .with_demand_precheck(true);
///
/// let result = sales
///     .process_sale(&[CartItem::new("CAM001", 8)], Some("Ana"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleProcessor<S> {
    inventory: InventoryRepository<S>,
    ledger: SaleLedger<S>,
    default_vendor: String,
    precheck_demand: bool,
}

impl<S: RecordStore> SaleProcessor<S> {
    /// Creates a processor with the default vendor and no precheck.
    pub fn new(store: S) -> Self {
        SaleProcessor {
            inventory: InventoryRepository::new(store.clone()),
            ledger: SaleLedger::new(store),
            default_vendor: DEFAULT_VENDOR.to_string(),
            precheck_demand: false,
        }
    }

    /// Vendor recorded when a request names none.
    pub fn with_default_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.default_vendor = vendor.into();
        self
    }

    /// Checks total demand per code against stock before decrementing anything.
    pub fn with_demand_precheck(mut self, enabled: bool) -> Self {
        self.precheck_demand = enabled;
        self
    }

    /// Sells a cart, stamped with the local time.
    ///
    /// ## Returns
    /// * `Ok(SaleResult)` - every line decremented and the sale recorded
    /// * `Err(SaleError)` - see [`SaleError`] for what was already applied
    pub async fn process_sale(
        &self,
        cart: &[CartItem],
        vendor: Option<&str>,
    ) -> Result<SaleResult, SaleError> {
        self.process_sale_at(cart, vendor, Local::now().naive_local())
            .await
    }

    /// Sells a cart with the sale id and ledger rows stamped at `now`.
    ///
    /// `lastUpdated` on the inventory rows still takes the wall clock.
    pub async fn process_sale_at(
        &self,
        cart: &[CartItem],
        vendor: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<SaleResult, SaleError> {
        let cart = normalize_cart(cart)?;
        let vendor = normalize_vendor(vendor, &self.default_vendor)?;

        if self.precheck_demand {
            self.check_demand(&cart).await?;
        }

        let sale_id = SaleId::generate(now.date());

        info!(
            sale_id = %sale_id,
            lines = cart.len(),
            vendor = %vendor,
            "Processing sale"
        );

        let mut lines: Vec<SaleLineResult> = Vec::with_capacity(cart.len());
        let mut alerts = Vec::new();
        let mut total = Money::zero();

        for (index, item) in cart.iter().enumerate() {
            let decrement = match self
                .inventory
                .decrement_stock(&item.code, item.quantity_sold)
                .await
            {
                Ok(decrement) => decrement,
                Err(source) => {
                    warn!(
                        sale_id = %sale_id,
                        line = index + 1,
                        code = %item.code,
                        applied = lines.len(),
                        error = %source,
                        "Sale aborted; earlier lines stay decremented"
                    );
                    return Err(SaleError::LineRejected {
                        line: index + 1,
                        code: item.code.clone(),
                        applied: lines,
                        source,
                    });
                }
            };

            let line = SaleLineResult::from(decrement);
            total = match total.checked_add(line.subtotal()) {
                Some(total) => total,
                None => {
                    warn!(
                        sale_id = %sale_id,
                        line = index + 1,
                        code = %item.code,
                        "Sale total overflows; this line is already decremented"
                    );
                    lines.push(line);
                    return Err(SaleError::LineRejected {
                        line: index + 1,
                        code: item.code.clone(),
                        applied: lines,
                        source: CoreError::AmountOverflow(format!(
                            "sale total exceeds {}",
                            Money::from_cents(i64::MAX)
                        ))
                        .into(),
                    });
                }
            };

            if let Some(alert) = SaleAlert::for_line(&line) {
                debug!(code = %line.code, remaining = line.new_quantity, "Low stock");
                alerts.push(alert);
            }
            lines.push(line);
        }

        if let Err(source) = self
            .ledger
            .append_at(&sale_id, &lines, total, &vendor, now)
            .await
        {
            warn!(
                sale_id = %sale_id,
                total = %total,
                error = %source,
                "Stock decremented but the sale was not recorded"
            );
            return Err(SaleError::LedgerWriteFailed {
                sale_id,
                total,
                applied: lines,
                source,
            });
        }

        info!(
            sale_id = %sale_id,
            total = %total,
            items = lines.len(),
            alerts = alerts.len(),
            "Sale recorded"
        );

        Ok(SaleResult {
            sale_id,
            total_cents: total.cents(),
            item_count: lines.len(),
            lines,
            alerts,
        })
    }

    /// Rejects the cart if any code's summed demand exceeds its stock.
    ///
    /// Reads only. Another writer can still take the stock before the
    /// decrements run.
    async fn check_demand(&self, cart: &[CartItem]) -> Result<(), SaleError> {
        // (first line, code, summed quantity), in cart order
        let mut demand: Vec<(usize, &str, i64)> = Vec::new();
        for (index, item) in cart.iter().enumerate() {
            match demand.iter_mut().find(|(_, code, _)| *code == item.code) {
                Some(entry) => entry.2 = entry.2.saturating_add(item.quantity_sold),
                None => demand.push((index + 1, item.code.as_str(), item.quantity_sold)),
            }
        }

        for (line, code, requested) in demand {
            let rejected = |source: StockError| SaleError::LineRejected {
                line,
                code: code.to_string(),
                applied: Vec::new(),
                source,
            };

            let product = self
                .inventory
                .get_by_code(code)
                .await
                .map_err(|e| rejected(e.into()))?
                .ok_or_else(|| rejected(CoreError::ProductNotFound(code.to_string()).into()))?;

            if !product.can_sell(requested) {
                debug!(code, available = product.quantity, requested, "Precheck rejected cart");
                return Err(rejected(
                    CoreError::InsufficientStock {
                        code: code.to_string(),
                        available: product.quantity,
                        requested,
                    }
                    .into(),
                ));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
