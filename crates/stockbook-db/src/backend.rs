//! # Backend Handle
//!
//! One object wiring a record store to every service built on it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Backend::new(store)          ← built once at startup, then injected   │
//! │     ├── inventory()  → InventoryRepository                             │
//! │     ├── ledger()     → SaleLedger                                      │
//! │     ├── sales()      → SaleProcessor (vendor default, precheck flag)   │
//! │     └── reports()    → ReportQueries                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers receive a `&Backend<S>` instead of reaching for a global
//! workbook, so tests can hand in a [`MemoryStore`](crate::store::memory::MemoryStore).

use stockbook_core::DEFAULT_VENDOR;

use crate::repository::inventory::InventoryRepository;
use crate::repository::ledger::SaleLedger;
use crate::report::ReportQueries;
use crate::sale::SaleProcessor;
use crate::store::RecordStore;

/// Store handle plus sale settings.
///
/// ## Usage
/// ```rust,ignore
/// let store = SqliteStore::connect(SqliteConfig::new("./stockbook.db")).await?;
/// let backend = Backend::new(store).with_default_vendor("Caja 1");
///
/// let products = backend.inventory().get_all().await?;
/// let sale = backend.sales().process_sale(&cart, None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Backend<S> {
    store: S,
    default_vendor: String,
    precheck_demand: bool,
}

impl<S: RecordStore> Backend<S> {
    /// Wraps a connected store with default sale settings.
    pub fn new(store: S) -> Self {
        Backend {
            store,
            default_vendor: DEFAULT_VENDOR.to_string(),
            precheck_demand: false,
        }
    }

    /// Vendor recorded when a sale request names none.
    pub fn with_default_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.default_vendor = vendor.into();
        self
    }

    /// Enables the per-code demand check before any decrement.
    pub fn with_demand_precheck(mut self, enabled: bool) -> Self {
        self.precheck_demand = enabled;
        self
    }

    /// The underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the inventory repository.
    pub fn inventory(&self) -> InventoryRepository<S> {
        InventoryRepository::new(self.store.clone())
    }

    /// Returns the sales ledger.
    pub fn ledger(&self) -> SaleLedger<S> {
        SaleLedger::new(self.store.clone())
    }

    /// Returns a sale processor carrying this backend's settings.
    pub fn sales(&self) -> SaleProcessor<S> {
        SaleProcessor::new(self.store.clone())
            .with_default_vendor(self.default_vendor.clone())
            .with_demand_precheck(self.precheck_demand)
    }

    /// Returns the reporting queries.
    pub fn reports(&self) -> ReportQueries<S> {
        ReportQueries::new(self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::{SqliteConfig, SqliteStore};
    use stockbook_core::{CartItem, Product};

    #[tokio::test]
    async fn test_sale_round_trip_on_sqlite() {
        let store = SqliteStore::connect(SqliteConfig::in_memory()).await.unwrap();
        let backend = Backend::new(store).with_default_vendor("Caja 1");

        backend
            .inventory()
            .add_products(&[Product {
                id: "1".to_string(),
                code: "CAM001".to_string(),
                name: "Camisa".to_string(),
                quantity: 10,
                unit_price_cents: 500,
                min_stock: 3,
                last_updated: None,
            }])
            .await
            .unwrap();

        let sale = backend
            .sales()
            .process_sale(&[CartItem::new("CAM001", 8)], None)
            .await
            .unwrap();
        assert_eq!(sale.total_cents, 4000);
        assert_eq!(sale.alerts.len(), 1);

        let camisa = backend.inventory().get_by_code("CAM001").await.unwrap().unwrap();
        assert_eq!(camisa.quantity, 2);

        let history = backend.ledger().query(None, None, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].vendor, "Caja 1");
        assert_eq!(history[0].sale_id, sale.sale_id.as_str());

        let alerts = backend.reports().low_stock_alerts().await;
        assert_eq!(alerts.data.len(), 1);
        assert!(backend.store().health_check().await);
    }
}
