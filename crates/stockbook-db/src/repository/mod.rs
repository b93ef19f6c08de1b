//! # Repository Module
//!
//! Database repository implementations for Stockbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(&input)                                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── list(&self)                                                       │
//! │  ├── get(&self, id)                                                    │
//! │  ├── record_sale(&self, input)      ← transactional                    │
//! │  ├── record_refund(&self, id)       ← transactional                    │
//! │  └── delete(&self, id)              ← transactional                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Compound writes stay atomic behind one method call                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`stock::StockRepository`] - Stock lines and receipt merging
//! - [`customer::CustomerRepository`] - Customer CRUD and search
//! - [`sale::SaleRepository`] - Sales, refunds and deletions
//! - [`payment::PaymentRepository`] - Payments and their ledger rows
//! - [`ledger::LedgerRepository`] - Account statement reads and advances

pub mod customer;
pub mod ledger;
pub mod payment;
pub mod sale;
pub mod stock;
