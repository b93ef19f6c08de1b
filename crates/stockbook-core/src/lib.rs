//! # stockbook-core: Pure Ledger Logic for Stockbook
//!
//! This crate is the **heart** of Stockbook. It contains the account-balance
//! and profit aggregation logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                        │   │
//! │  │    stock / customers / sales / payments / reports / PDF          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockbook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │  reports  │  │   │
//! │  │   │ StockItem │  │   Money   │  │ balances  │  │  profit   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │ grouping  │  │  charts   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockbook-db (Database Layer)                  │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockItem, Customer, Sale, Payment, LedgerEntry)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - Balance, grouping, and stock mutation logic
//! - [`reports`] - Profit report and chart series assembly
//! - [`palette`] - Chart color configuration data
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod palette;
pub mod reports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stockbook_core::Money` instead of
// `use stockbook_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{GroupBy, SaleGroup, SortBy};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which an item counts as "low stock" on the
/// dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum quantity accepted for a single sale or stock receipt.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 10000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 9999;

/// How many customers the sales-by-customer chart shows.
pub const CHART_TOP_CUSTOMERS: usize = 15;

/// How many stock items the profit chart shows.
pub const CHART_TOP_ITEMS: usize = 8;
