//! # Ledger Module
//!
//! The account-balance and profit aggregation logic: pure functions that turn
//! unordered sale/payment/ledger rows into summary figures, plus the stock
//! mutations a sale, refund, delete or receipt implies.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ledger Operations                                │
//! │                                                                         │
//! │  customer_balance(sales, payments, ledger)  → Money                     │
//! │  group_sales(sales, group_by, sort_by)      → Vec<SaleGroup>            │
//! │  apply_sale(stock, customer, qty, rate)     → SaleOutcome               │
//! │  apply_refund(stock, original)              → RefundOutcome             │
//! │  apply_delete(stock?, sale)                 → Option<StockItem>         │
//! │  merge_stock_receipt(existing?, …)          → StockItem                 │
//! │                                                                         │
//! │  All pure: callers persist the returned state atomically.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sign Conventions
//! - Refund rows mirror the original sale's positive quantities/amounts;
//!   only `profit_cents` is pre-negated at write time.
//! - Balance = sales − refunds − payments + advances.
//! - Stock quantity is signed and may go negative on an oversell.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, LedgerEntry, LedgerKind, Payment, Sale, SaleDraft, StockItem};
use crate::validation::validate_quantity;

// =============================================================================
// Customer Balance
// =============================================================================

/// Computes a customer's outstanding balance from their raw rows.
///
/// ## Formula
/// ```text
/// balance = Σ total (sales)            what the customer bought
///         − Σ total (refunds)          what was handed back
///         − Σ amount (payments)        what the customer has paid
///         + Σ amount (ledger advances) credit taken before any sale
/// ```
///
/// Input slices need not be sorted; empty slices contribute 0. This is a
/// pure fold over supplied data - the caller fetches the rows.
pub fn customer_balance(sales: &[Sale], payments: &[Payment], ledger: &[LedgerEntry]) -> Money {
    let sold: Money = sales
        .iter()
        .filter(|s| !s.is_refund)
        .map(|s| s.total())
        .sum();

    let refunded: Money = sales
        .iter()
        .filter(|s| s.is_refund)
        .map(|s| s.total())
        .sum();

    let paid: Money = payments.iter().map(|p| p.amount()).sum();

    let advances: Money = ledger
        .iter()
        .filter(|e| e.kind == LedgerKind::Advance)
        .map(|e| e.amount())
        .sum();

    sold - refunded - paid + advances
}

// =============================================================================
// Grouped Aggregation
// =============================================================================

/// How sale rows are grouped for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One group per customer (name, phone).
    Customer,
    /// One group per stock line (size, color).
    #[default]
    Item,
    /// One group per size across all colors.
    Size,
    /// One group per color across all sizes.
    Color,
}

/// Sort key for grouped output. Always descending; ties keep first-seen
/// order (the sort is stable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    #[serde(alias = "revenue")]
    NetRevenue,
    #[serde(alias = "quantity")]
    NetQuantity,
    Transactions,
}

/// Aggregate figures for one group of sale rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleGroup {
    /// Stable group key: `size_color`, `size`, `color` or `name|phone`.
    pub key: String,
    /// Display label: `M - Red`, `M`, `Red` or the customer name.
    pub label: String,
    pub quantity_sold: i64,
    pub quantity_refunded: i64,
    pub sales_amount_cents: i64,
    pub refund_amount_cents: i64,
    pub sales_count: i64,
    pub refund_count: i64,
    /// Plain sum of `profit_cents` - refund rows are pre-negated.
    pub profit_cents: i64,
}

impl SaleGroup {
    fn empty(key: String, label: String) -> Self {
        SaleGroup {
            key,
            label,
            quantity_sold: 0,
            quantity_refunded: 0,
            sales_amount_cents: 0,
            refund_amount_cents: 0,
            sales_count: 0,
            refund_count: 0,
            profit_cents: 0,
        }
    }

    /// sales − refunds, in cents.
    #[inline]
    pub fn net_revenue(&self) -> Money {
        Money::from_cents(self.sales_amount_cents - self.refund_amount_cents)
    }

    /// quantity sold − quantity refunded.
    #[inline]
    pub fn net_quantity(&self) -> i64 {
        self.quantity_sold - self.quantity_refunded
    }

    /// Total number of rows (sales + refunds) in the group.
    #[inline]
    pub fn transaction_count(&self) -> i64 {
        self.sales_count + self.refund_count
    }

    /// Accumulated profit as Money.
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }

    fn metric(&self, sort_by: SortBy) -> i64 {
        match sort_by {
            SortBy::NetRevenue => self.net_revenue().cents(),
            SortBy::NetQuantity => self.net_quantity(),
            SortBy::Transactions => self.transaction_count(),
        }
    }
}

fn group_key_label(sale: &Sale, group_by: GroupBy) -> (String, String) {
    match group_by {
        GroupBy::Customer => (
            format!("{}|{}", sale.customer_name, sale.customer_phone),
            sale.customer_name.clone(),
        ),
        GroupBy::Item => (
            format!("{}_{}", sale.stock_size, sale.stock_color),
            format!("{} - {}", sale.stock_size, sale.stock_color),
        ),
        GroupBy::Size => (sale.stock_size.clone(), sale.stock_size.clone()),
        GroupBy::Color => (sale.stock_color.clone(), sale.stock_color.clone()),
    }
}

/// Groups sale rows by the requested key and accumulates per-group figures.
///
/// Output is sorted descending by `sort_by`; ties keep the order groups were
/// first seen in the input (stable sort over insertion order).
pub fn group_sales(sales: &[Sale], group_by: GroupBy, sort_by: SortBy) -> Vec<SaleGroup> {
    let mut groups: Vec<SaleGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sale in sales {
        let (key, label) = group_key_label(sale, group_by);
        let idx = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(SaleGroup::empty(key, label));
            groups.len() - 1
        });

        let group = &mut groups[idx];
        if sale.is_refund {
            group.quantity_refunded += sale.quantity;
            group.refund_amount_cents += sale.total_cents;
            group.refund_count += 1;
        } else {
            group.quantity_sold += sale.quantity;
            group.sales_amount_cents += sale.total_cents;
            group.sales_count += 1;
        }
        group.profit_cents += sale.profit_cents;
    }

    groups.sort_by_key(|g| std::cmp::Reverse(g.metric(sort_by)));
    groups
}

// =============================================================================
// Sale Application
// =============================================================================

/// Result of applying a sale against a stock line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOutcome {
    /// The stock line after the decrement.
    pub stock: StockItem,
    /// The sale row to persist (id and date assigned by the store).
    pub sale: SaleDraft,
    /// True when the decrement drove quantity below zero. The operation
    /// proceeds; the caller surfaces this as a warning.
    pub negative_stock: bool,
}

/// Applies a sale: snapshots the unit cost, computes totals and profit, and
/// decrements the stock line.
///
/// ## Figures
/// ```text
/// total      = quantity × rate
/// total_cost = quantity × stock.cost_per_unit   (snapshot)
/// profit     = total − total_cost
/// stock.quantity   −= quantity
/// stock.total_cost −= total_cost
/// ```
///
/// There is no hard stock check: quantity is allowed to go negative so the
/// shop can record an oversell and sort the count out later.
pub fn apply_sale(
    stock: &StockItem,
    customer: &Customer,
    quantity: i64,
    rate: Money,
) -> CoreResult<SaleOutcome> {
    validate_quantity(quantity)?;

    let cost_per_unit = stock.cost_per_unit();
    let total = rate.multiply_quantity(quantity);
    let total_cost = cost_per_unit.multiply_quantity(quantity);
    let profit = total - total_cost;

    let mut updated = stock.clone();
    updated.quantity -= quantity;
    updated.total_cost_cents -= total_cost.cents();

    let sale = SaleDraft {
        customer_name: customer.name.clone(),
        customer_phone: customer.phone.clone(),
        stock_size: stock.size.clone(),
        stock_color: stock.color.clone(),
        quantity,
        rate_cents: rate.cents(),
        total_cents: total.cents(),
        cost_per_unit_cents: cost_per_unit.cents(),
        total_cost_cents: total_cost.cents(),
        profit_cents: profit.cents(),
        is_refund: false,
        refund_of: None,
    };

    let negative_stock = updated.quantity < 0;
    Ok(SaleOutcome {
        stock: updated,
        sale,
        negative_stock,
    })
}

// =============================================================================
// Refund Application
// =============================================================================

/// Result of applying a refund against a stock line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundOutcome {
    /// The stock line after restoration.
    pub stock: StockItem,
    /// The refund row to persist.
    pub refund: SaleDraft,
}

/// Applies a refund: duplicates the original sale's figures with
/// `is_refund = true` and `profit = −original.profit`, and restores the
/// stock line (the exact inverse of [`apply_sale`]).
///
/// Refunding a refund is rejected with [`CoreError::AlreadyRefund`].
pub fn apply_refund(stock: &StockItem, original: &Sale) -> CoreResult<RefundOutcome> {
    if original.is_refund {
        return Err(CoreError::AlreadyRefund(original.sale_id));
    }

    let mut updated = stock.clone();
    updated.quantity += original.quantity;
    updated.total_cost_cents += original.total_cost_cents;

    let refund = SaleDraft {
        customer_name: original.customer_name.clone(),
        customer_phone: original.customer_phone.clone(),
        stock_size: original.stock_size.clone(),
        stock_color: original.stock_color.clone(),
        quantity: original.quantity,
        rate_cents: original.rate_cents,
        total_cents: original.total_cents,
        cost_per_unit_cents: original.cost_per_unit_cents,
        total_cost_cents: original.total_cost_cents,
        profit_cents: -original.profit_cents,
        is_refund: true,
        refund_of: Some(original.sale_id),
    };

    Ok(RefundOutcome {
        stock: updated,
        refund,
    })
}

// =============================================================================
// Delete Application
// =============================================================================

/// Computes the stock restoration implied by deleting a sale row.
///
/// Deleting a **non-refund** sale restores the stock it consumed (the
/// inverse of [`apply_sale`]). Deleting a **refund** row touches no stock:
/// the stock that refund put back stays put, and the original sale's own
/// effect is left alone. Returns the updated stock line, or `None` when no
/// restoration applies (refund rows, or the stock line no longer exists).
///
/// The caller also deletes any ledger rows referencing this sale.
pub fn apply_delete(stock: Option<&StockItem>, sale: &Sale) -> Option<StockItem> {
    if sale.is_refund {
        return None;
    }

    stock.map(|s| {
        let mut updated = s.clone();
        updated.quantity += sale.quantity;
        updated.total_cost_cents += sale.total_cost_cents;
        updated
    })
}

// =============================================================================
// Stock Receipt
// =============================================================================

/// Merges a stock receipt into an existing line (or creates one), keeping
/// the weighted-average unit cost.
///
/// ## Weighted-Average Cost
/// ```text
/// new_quantity   = existing.quantity   + incoming_quantity
/// new_total_cost = existing.total_cost + incoming_total_cost
/// cost_per_unit  = new_total_cost / new_quantity   (0 when quantity ≤ 0)
/// ```
///
/// The accumulation is over raw sums, so two receipts merge to the same
/// line as one combined receipt would (associativity).
pub fn merge_stock_receipt(
    existing: Option<&StockItem>,
    size: &str,
    color: &str,
    incoming_quantity: i64,
    incoming_total_cost: Money,
) -> StockItem {
    let (quantity, total_cost) = match existing {
        Some(item) => (
            item.quantity + incoming_quantity,
            item.total_cost() + incoming_total_cost,
        ),
        None => (incoming_quantity, incoming_total_cost),
    };

    StockItem {
        size: size.to_string(),
        color: color.to_string(),
        quantity,
        cost_per_unit_cents: total_cost.divide_quantity(quantity).cents(),
        total_cost_cents: total_cost.cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stock(quantity: i64, cpu: i64, total_cost: i64) -> StockItem {
        StockItem {
            size: "M".to_string(),
            color: "Red".to_string(),
            quantity,
            cost_per_unit_cents: cpu,
            total_cost_cents: total_cost,
        }
    }

    fn customer() -> Customer {
        Customer {
            name: "Asha".to_string(),
            phone: "0301".to_string(),
            company: None,
        }
    }

    fn sale_row(total: i64, profit: i64, is_refund: bool) -> Sale {
        Sale {
            sale_id: 1,
            customer_name: "Asha".to_string(),
            customer_phone: "0301".to_string(),
            stock_size: "M".to_string(),
            stock_color: "Red".to_string(),
            quantity: 1,
            rate_cents: total,
            total_cents: total,
            cost_per_unit_cents: 0,
            total_cost_cents: 0,
            profit_cents: profit,
            is_refund,
            refund_of: None,
            date: Utc::now(),
        }
    }

    fn payment_row(amount: i64) -> Payment {
        Payment {
            payment_id: 1,
            customer_name: "Asha".to_string(),
            customer_phone: "0301".to_string(),
            amount_cents: amount,
            description: None,
            date: Utc::now(),
        }
    }

    fn ledger_row(amount: i64, kind: LedgerKind) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            customer_name: "Asha".to_string(),
            customer_phone: "0301".to_string(),
            amount_cents: amount,
            kind,
            related_sale_id: None,
            related_payment_id: None,
            date: Utc::now(),
            note: None,
        }
    }

    // -------------------------------------------------------------------------
    // customer_balance
    // -------------------------------------------------------------------------

    #[test]
    fn test_balance_of_nothing_is_zero() {
        assert_eq!(customer_balance(&[], &[], &[]), Money::zero());
    }

    /// Worked example: sales 200, refund 50, payments 30, advances 10
    /// → balance = 200 − 50 − 30 + 10 = 130.
    #[test]
    fn test_balance_worked_example() {
        let sales = vec![
            sale_row(12000, 0, false),
            sale_row(8000, 0, false),
            sale_row(5000, 0, true),
        ];
        let payments = vec![payment_row(3000)];
        let ledger = vec![
            ledger_row(1000, LedgerKind::Advance),
            // Non-advance ledger rows must not contribute
            ledger_row(12000, LedgerKind::Sale),
            ledger_row(3000, LedgerKind::Payment),
        ];

        let balance = customer_balance(&sales, &payments, &ledger);
        assert_eq!(balance, Money::from_cents(13000));
    }

    /// Balance is linear: adding one sale with total T moves the balance by
    /// exactly T (by −T when the row is a refund).
    #[test]
    fn test_balance_linearity() {
        let base = vec![sale_row(7000, 0, false)];
        let before = customer_balance(&base, &[], &[]);

        let mut with_sale = base.clone();
        with_sale.push(sale_row(2500, 0, false));
        assert_eq!(
            customer_balance(&with_sale, &[], &[]),
            before + Money::from_cents(2500)
        );

        let mut with_refund = base;
        with_refund.push(sale_row(2500, 0, true));
        assert_eq!(
            customer_balance(&with_refund, &[], &[]),
            before - Money::from_cents(2500)
        );
    }

    // -------------------------------------------------------------------------
    // group_sales
    // -------------------------------------------------------------------------

    fn grouped_sale(size: &str, color: &str, qty: i64, total: i64, is_refund: bool) -> Sale {
        let mut s = sale_row(total, 0, is_refund);
        s.stock_size = size.to_string();
        s.stock_color = color.to_string();
        s.quantity = qty;
        s
    }

    /// [(S,Red,2,20,sale),(S,Red,1,10,refund)] grouped by item
    /// yields one group with sold=2, refunded=1, sales=20, refunds=10.
    #[test]
    fn test_group_by_item_example() {
        let sales = vec![
            grouped_sale("S", "Red", 2, 2000, false),
            grouped_sale("S", "Red", 1, 1000, true),
        ];

        let groups = group_sales(&sales, GroupBy::Item, SortBy::NetRevenue);
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.key, "S_Red");
        assert_eq!(g.label, "S - Red");
        assert_eq!(g.quantity_sold, 2);
        assert_eq!(g.quantity_refunded, 1);
        assert_eq!(g.sales_amount_cents, 2000);
        assert_eq!(g.refund_amount_cents, 1000);
        assert_eq!(g.sales_count, 1);
        assert_eq!(g.refund_count, 1);
        assert_eq!(g.net_revenue().cents(), 1000);
        assert_eq!(g.net_quantity(), 1);
    }

    #[test]
    fn test_group_by_size_merges_colors() {
        let sales = vec![
            grouped_sale("S", "Red", 2, 2000, false),
            grouped_sale("S", "Blue", 3, 1500, false),
            grouped_sale("M", "Red", 1, 5000, false),
        ];

        let groups = group_sales(&sales, GroupBy::Size, SortBy::NetRevenue);
        assert_eq!(groups.len(), 2);
        // M (5000) outranks S (3500)
        assert_eq!(groups[0].key, "M");
        assert_eq!(groups[1].key, "S");
        assert_eq!(groups[1].quantity_sold, 5);
    }

    #[test]
    fn test_group_by_customer_counts_transactions() {
        let mut a = grouped_sale("S", "Red", 1, 1000, false);
        a.customer_name = "Asha".to_string();
        let mut b = grouped_sale("S", "Red", 1, 1000, true);
        b.customer_name = "Asha".to_string();
        let mut c = grouped_sale("S", "Red", 4, 900, false);
        c.customer_name = "Bilal".to_string();
        c.customer_phone = "0302".to_string();

        let groups = group_sales(&[a, b, c], GroupBy::Customer, SortBy::Transactions);
        assert_eq!(groups[0].label, "Asha");
        assert_eq!(groups[0].transaction_count(), 2);
        assert_eq!(groups[1].label, "Bilal");
    }

    /// Ties keep first-seen order (stable sort over insertion order).
    #[test]
    fn test_group_sort_is_stable_on_ties() {
        let sales = vec![
            grouped_sale("A", "Red", 1, 1000, false),
            grouped_sale("B", "Red", 1, 1000, false),
            grouped_sale("C", "Red", 1, 1000, false),
        ];

        let groups = group_sales(&sales, GroupBy::Size, SortBy::NetRevenue);
        let order: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    /// Refund profit is pre-negated at write time, so group profit is a
    /// plain sum.
    #[test]
    fn test_group_profit_plain_sum() {
        let sales = vec![
            grouped_sale("S", "Red", 2, 2000, false),
            grouped_sale("S", "Red", 1, 1000, true),
        ];
        let mut sales = sales;
        sales[0].profit_cents = 900;
        sales[1].profit_cents = -450;

        let groups = group_sales(&sales, GroupBy::Item, SortBy::NetRevenue);
        assert_eq!(groups[0].profit_cents, 450);
    }

    // -------------------------------------------------------------------------
    // apply_sale / apply_refund / apply_delete
    // -------------------------------------------------------------------------

    /// Worked example: stock 10 @ cpu 5 (total 50), sale of 3 at rate 8
    /// → total 24, cost 15, profit 9; stock ends at 7 / total_cost 35.
    #[test]
    fn test_apply_sale_worked_example() {
        let stock = stock(10, 500, 5000);
        let outcome = apply_sale(&stock, &customer(), 3, Money::from_cents(800)).unwrap();

        assert_eq!(outcome.sale.total_cents, 2400);
        assert_eq!(outcome.sale.cost_per_unit_cents, 500);
        assert_eq!(outcome.sale.total_cost_cents, 1500);
        assert_eq!(outcome.sale.profit_cents, 900);
        assert!(!outcome.sale.is_refund);

        assert_eq!(outcome.stock.quantity, 7);
        assert_eq!(outcome.stock.total_cost_cents, 3500);
        assert!(!outcome.negative_stock);
    }

    #[test]
    fn test_apply_sale_allows_negative_stock_with_warning() {
        let stock = stock(2, 500, 1000);
        let outcome = apply_sale(&stock, &customer(), 5, Money::from_cents(800)).unwrap();

        assert_eq!(outcome.stock.quantity, -3);
        assert!(outcome.negative_stock);
    }

    #[test]
    fn test_apply_sale_rejects_non_positive_quantity() {
        let stock = stock(10, 500, 5000);
        assert!(apply_sale(&stock, &customer(), 0, Money::from_cents(800)).is_err());
        assert!(apply_sale(&stock, &customer(), -2, Money::from_cents(800)).is_err());
    }

    /// Round-trip property: refunding a sale restores the pre-sale stock
    /// figures exactly, and the refund's profit is the negated original.
    #[test]
    fn test_refund_restores_pre_sale_stock() {
        let before = stock(10, 500, 5000);
        let outcome = apply_sale(&before, &customer(), 3, Money::from_cents(800)).unwrap();

        let persisted = Sale {
            sale_id: 7,
            date: Utc::now(),
            customer_name: outcome.sale.customer_name.clone(),
            customer_phone: outcome.sale.customer_phone.clone(),
            stock_size: outcome.sale.stock_size.clone(),
            stock_color: outcome.sale.stock_color.clone(),
            quantity: outcome.sale.quantity,
            rate_cents: outcome.sale.rate_cents,
            total_cents: outcome.sale.total_cents,
            cost_per_unit_cents: outcome.sale.cost_per_unit_cents,
            total_cost_cents: outcome.sale.total_cost_cents,
            profit_cents: outcome.sale.profit_cents,
            is_refund: false,
            refund_of: None,
        };

        let refund = apply_refund(&outcome.stock, &persisted).unwrap();
        assert_eq!(refund.stock.quantity, before.quantity);
        assert_eq!(refund.stock.total_cost_cents, before.total_cost_cents);
        assert_eq!(refund.refund.profit_cents, -persisted.profit_cents);
        assert_eq!(refund.refund.refund_of, Some(7));
        assert!(refund.refund.is_refund);
    }

    #[test]
    fn test_refund_of_refund_rejected() {
        let s = stock(10, 500, 5000);
        let mut row = sale_row(2400, 900, true);
        row.sale_id = 9;

        let err = apply_refund(&s, &row).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyRefund(9)));
    }

    /// Deleting a sale right after creating it restores the pre-sale stock.
    #[test]
    fn test_delete_after_create_restores_stock() {
        let before = stock(10, 500, 5000);
        let outcome = apply_sale(&before, &customer(), 3, Money::from_cents(800)).unwrap();

        let mut persisted = sale_row(2400, 900, false);
        persisted.quantity = 3;
        persisted.total_cost_cents = 1500;

        let restored = apply_delete(Some(&outcome.stock), &persisted).unwrap();
        assert_eq!(restored.quantity, before.quantity);
        assert_eq!(restored.total_cost_cents, before.total_cost_cents);
    }

    /// Deleting a refund row leaves stock untouched. The stock the refund
    /// restored stays restored - a deliberate simplification carried over
    /// from the product's bookkeeping rules.
    #[test]
    fn test_delete_refund_row_leaves_stock_alone() {
        let s = stock(10, 500, 5000);
        let row = sale_row(2400, -900, true);
        assert_eq!(apply_delete(Some(&s), &row), None);
    }

    // -------------------------------------------------------------------------
    // merge_stock_receipt
    // -------------------------------------------------------------------------

    #[test]
    fn test_merge_into_empty_creates_line() {
        let item = merge_stock_receipt(None, "M", "Red", 10, Money::from_cents(5000));
        assert_eq!(item.quantity, 10);
        assert_eq!(item.total_cost_cents, 5000);
        assert_eq!(item.cost_per_unit_cents, 500);
    }

    #[test]
    fn test_merge_weighted_average() {
        let first = merge_stock_receipt(None, "M", "Red", 10, Money::from_cents(5000));
        let second = merge_stock_receipt(Some(&first), "M", "Red", 10, Money::from_cents(7000));

        assert_eq!(second.quantity, 20);
        assert_eq!(second.total_cost_cents, 12000);
        assert_eq!(second.cost_per_unit_cents, 600);
    }

    /// Associativity: two receipts (q1,c1) then (q2,c2) equal one combined
    /// receipt (q1+q2, c1+c2).
    #[test]
    fn test_merge_is_associative() {
        let stepwise = {
            let first = merge_stock_receipt(None, "M", "Red", 4, Money::from_cents(1300));
            merge_stock_receipt(Some(&first), "M", "Red", 6, Money::from_cents(2900))
        };
        let combined = merge_stock_receipt(None, "M", "Red", 10, Money::from_cents(4200));

        assert_eq!(stepwise, combined);
    }

    #[test]
    fn test_merge_non_positive_quantity_zeroes_unit_cost() {
        let drained = stock(-2, 500, -1000);
        let item = merge_stock_receipt(Some(&drained), "M", "Red", 1, Money::from_cents(500));
        assert_eq!(item.quantity, -1);
        assert_eq!(item.cost_per_unit_cents, 0);
    }
}
