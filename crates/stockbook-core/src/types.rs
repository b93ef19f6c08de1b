//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockItem     │   │      Sale       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  (size, color)  │   │  sale_id        │   │  payment_id     │       │
//! │  │  quantity       │   │  is_refund      │   │  amount_cents   │       │
//! │  │  cost_per_unit  │   │  profit_cents   │   │  description    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Customer     │   │  LedgerEntry    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  (name, phone)  │   │  kind: Sale /   │  append-only audit log      │
//! │  │  company        │   │  Refund /       │                             │
//! │  └─────────────────┘   │  Payment /      │                             │
//! │                        │  Advance        │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Natural-Key Identity
//! Stock items are keyed by (size, color) and customers by (name, phone);
//! sales and payments carry surrogate integer ids assigned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Stock Item
// =============================================================================

/// A stock line, keyed by (size, color).
///
/// ## Invariant
/// `total_cost_cents ≈ quantity × cost_per_unit_cents` while quantity > 0.
/// Both fields are adjusted together on every sale, refund and receipt.
/// Quantity is signed and **may go negative** - overselling is allowed and
/// surfaced to the caller as a warning, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockItem {
    pub size: String,
    pub color: String,

    /// On-hand quantity. Signed: overselling drives this negative.
    pub quantity: i64,

    /// Weighted-average cost per unit, in cents.
    pub cost_per_unit_cents: i64,

    /// Accumulated cost of the on-hand quantity, in cents.
    pub total_cost_cents: i64,
}

impl StockItem {
    /// Returns the weighted-average unit cost as Money.
    #[inline]
    pub fn cost_per_unit(&self) -> Money {
        Money::from_cents(self.cost_per_unit_cents)
    }

    /// Returns the accumulated cost as Money.
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    /// Whether this line counts as low stock on the dashboard.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= crate::LOW_STOCK_THRESHOLD
    }

    /// Display label, e.g. `M - Red`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.size, self.color)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer, keyed by (name, phone). The keys are immutable; only the
/// company field may be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub company: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale row. Refunds are **second rows** with `is_refund = true` that
/// mirror the original sale's quantities and amounts; the profit field on a
/// refund row is pre-negated at write time, so aggregation is a plain sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub sale_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub stock_size: String,
    pub stock_color: String,
    pub quantity: i64,

    /// Unit selling price in cents.
    pub rate_cents: i64,

    /// quantity × rate, in cents.
    pub total_cents: i64,

    /// Unit cost snapshotted from the stock line at sale time.
    pub cost_per_unit_cents: i64,

    /// quantity × cost_per_unit, in cents.
    pub total_cost_cents: i64,

    /// total − total_cost. Pre-negated on refund rows.
    pub profit_cents: i64,

    pub is_refund: bool,

    /// For refund rows: the sale_id of the sale being refunded.
    pub refund_of: Option<i64>,

    pub date: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_cents(self.rate_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }

    /// Stock key of the line this sale drew from.
    #[inline]
    pub fn stock_key(&self) -> (&str, &str) {
        (&self.stock_size, &self.stock_color)
    }
}

/// An unsaved sale produced by the pure ledger operations. The store assigns
/// `sale_id` and the timestamp when it persists the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub stock_size: String,
    pub stock_color: String,
    pub quantity: i64,
    pub rate_cents: i64,
    pub total_cents: i64,
    pub cost_per_unit_cents: i64,
    pub total_cost_cents: i64,
    pub profit_cents: i64,
    pub is_refund: bool,
    pub refund_of: Option<i64>,
}

impl SaleDraft {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment received from a customer against their outstanding balance.
///
/// Every payment is mirrored into the ledger as its projection; the two rows
/// are written in one transaction (see `PaymentRepository::record_payment`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub payment_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// Kind of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Money owed by the customer (a sale was made).
    Sale,
    /// A sale was reversed.
    Refund,
    /// Money received from the customer.
    Payment,
    /// Money received ahead of any sale; credited against the balance.
    Advance,
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LedgerKind::Sale => "sale",
            LedgerKind::Refund => "refund",
            LedgerKind::Payment => "payment",
            LedgerKind::Advance => "advance",
        };
        f.write_str(label)
    }
}

/// An append-only record of a monetary movement per customer, used for
/// balance reconciliation independent of the sale/payment tables.
///
/// Rows are never updated in place; reversals are new rows, and deletion
/// happens only as a side effect of deleting the referencing sale/payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_cents: i64,
    pub kind: LedgerKind,
    pub related_sale_id: Option<i64>,
    pub related_payment_id: Option<i64>,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
}

impl LedgerEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_item_label() {
        let item = StockItem {
            size: "M".to_string(),
            color: "Red".to_string(),
            quantity: 10,
            cost_per_unit_cents: 500,
            total_cost_cents: 5000,
        };
        assert_eq!(item.label(), "M - Red");
        assert!(!item.is_low_stock());
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        let item = StockItem {
            size: "S".to_string(),
            color: "Blue".to_string(),
            quantity: crate::LOW_STOCK_THRESHOLD,
            cost_per_unit_cents: 0,
            total_cost_cents: 0,
        };
        assert!(item.is_low_stock());
    }

    #[test]
    fn test_ledger_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&LedgerKind::Advance).unwrap(),
            "\"advance\""
        );
        let kind: LedgerKind = serde_json::from_str("\"payment\"").unwrap();
        assert_eq!(kind, LedgerKind::Payment);
    }
}
