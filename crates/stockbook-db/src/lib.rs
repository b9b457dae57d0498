//! # stockbook-db: Record Store Layer for Stockbook
//!
//! Everything that round-trips to the workbook: the store adapter, its
//! backends, the repositories and the sale/report services on top.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  CLI command (sale CAM001:8)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   Backend ──► SaleProcessor ──► InventoryRepository             │   │
//! │  │           ──► ReportQueries ──► SaleLedger                      │   │
//! │  │                                      │                          │   │
//! │  │                                      ▼                          │   │
//! │  │                         RecordStore (trait)                     │   │
//! │  │                  ┌───────────────┴───────────────┐              │   │
//! │  │            SqliteStore                      MemoryStore          │   │
//! │  │      (sheet_cells table, WAL)       (tests, failure injection)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Record store trait, sheet layout, backends
//! - [`migrations`] - Embedded SQLite migrations
//! - [`error`] - Store, stock and sale error types
//! - [`repository`] - Inventory repository and sales ledger
//! - [`sale`] - Sale transaction processing
//! - [`report`] - History, daily summary, low-stock alerts
//! - [`backend`] - Handle bundling a store with its services
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{Backend, SqliteConfig, SqliteStore};
//!
//! let store = SqliteStore::connect(SqliteConfig::new("./stockbook.db")).await?;
//! let backend = Backend::new(store);
//!
//! let result = backend.sales().process_sale(&cart, Some("Ana")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod migrations;
pub mod report;
pub mod repository;
pub mod sale;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::Backend;
pub use error::{DbError, DbResult, SaleError, StockError};
pub use report::{Report, ReportQueries};
pub use sale::SaleProcessor;
pub use store::memory::MemoryStore;
pub use store::sqlite::{SqliteConfig, SqliteStore};
pub use store::{RecordStore, Sheet};

// Repository re-exports for convenience
pub use repository::inventory::InventoryRepository;
pub use repository::ledger::SaleLedger;
