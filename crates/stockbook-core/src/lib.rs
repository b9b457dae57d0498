//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate holds the domain of the Stockbook point-of-sale backend as pure
//! types and functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Command layer (apps/cli)                        │   │
//! │  │   inventory, product, sale, history, summary, alerts            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (store + sale core)                │   │
//! │  │   RecordStore ◄── InventoryRepository / SaleLedger              │   │
//! │  │                   SaleProcessor / ReportQueries                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockbook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CoreError │  │   cart    │  │   │
//! │  │   │  SaleId   │  │  parsing  │  │           │  │   dates   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartItem, SaleResult, LedgerRow, ...)
//! - [`money`] - Money type with integer arithmetic and cell parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation (carts, codes, dates)
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::money::Money;
//!
//! let price = Money::parse_decimal("5.00").unwrap();
//! let subtotal = price.multiply_quantity(8);
//! assert_eq!(subtotal.to_decimal_string(), "40.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Vendor recorded on a sale when the request does not name one.
pub const DEFAULT_VENDOR: &str = "Sistema";

/// Prefix of every generated sale identifier.
pub const SALE_ID_PREFIX: &str = "VTA";

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Every line costs several store round-trips; a runaway cart would hold
/// the terminal for minutes.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum length of a vendor name.
pub const MAX_VENDOR_LEN: usize = 100;

/// Date format of ledger rows (`YYYY-MM-DD`, zero padded so string order is date order).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format of ledger rows.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Format of the `lastUpdated` inventory stamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
