//! # stockbook-db: Database Layer for Stockbook
//!
//! This crate provides database access for the Stockbook system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockbook Data Flow                               │
//! │                                                                         │
//! │  HTTP Handler (record_sale)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (stock.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │   sale.rs…)   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ StockRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ SaleRepo      │    │ ...          │  │   │
//! │  │   │ Management    │    │ PaymentRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (stockbook.db)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (stock, customer, sale, ...)
//!
//! ## Transactional Writes
//!
//! Compound mutations run atomically: a sale updates the stock line, inserts
//! the sale row, and appends a ledger entry in one transaction. Either all
//! three land or none do.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/stockbook.db");
//! let db = Database::new(config).await?;
//!
//! let lines = db.stock().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::ledger::{LedgerRepository, NewAdvance};
pub use repository::payment::{NewPayment, PaymentRepository};
pub use repository::sale::{NewSale, RecordedSale, SaleRepository};
pub use repository::stock::StockRepository;
