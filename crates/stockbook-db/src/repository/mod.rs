//! # Repository Module
//!
//! Typed access to the two worksheets.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories over a Record Store                     │
//! │                                                                         │
//! │  SaleProcessor / ReportQueries                                         │
//! │       │                                                                 │
//! │       │  backend.inventory().decrement_stock("CAM001", 8)              │
//! │       ▼                                                                 │
//! │  InventoryRepository            SaleLedger                             │
//! │  ├── get_all                    ├── append / append_at                 │
//! │  ├── get_by_code                └── query                              │
//! │  ├── decrement_stock                                                   │
//! │  └── add_products                                                      │
//! │       │                              │                                  │
//! │       │  text cells ⇄ typed values   │                                  │
//! │       ▼                              ▼                                  │
//! │  RecordStore (SQLite / in-memory)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`](inventory::InventoryRepository) - Product reads and stock decrements
//! - [`SaleLedger`](ledger::SaleLedger) - Append-only sales history

mod cells;
pub mod inventory;
pub mod ledger;
