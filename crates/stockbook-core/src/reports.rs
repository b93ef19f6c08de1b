//! # Reports Module
//!
//! Report assembly on top of the ledger aggregates: the profit report,
//! per-customer rows with payment/outstanding figures, and the chart series
//! the report pages render.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Pipeline                                  │
//! │                                                                         │
//! │  raw rows ──► ledger::group_sales ──► SaleGroup[]                       │
//! │                                          │                              │
//! │                    ┌─────────────────────┼──────────────────┐           │
//! │                    ▼                     ▼                  ▼           │
//! │            customer_rows()        group_chart()     profit_report()     │
//! │            (payments joined)      (palette colors)  (monthly + totals)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All functions here are pure; the server layer fetches rows and serializes
//! the output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ledger::{GroupBy, SaleGroup, SortBy};
use crate::money::Money;
use crate::palette::Palette;
use crate::types::{Payment, Sale};
use crate::{CHART_TOP_CUSTOMERS, CHART_TOP_ITEMS};

// =============================================================================
// Chart Series
// =============================================================================

/// Label/value/color triples ready for a bar or doughnut chart. Values are
/// major currency units (or plain counts, depending on the metric).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

impl ChartSeries {
    pub fn empty() -> Self {
        ChartSeries {
            labels: Vec::new(),
            values: Vec::new(),
            colors: Vec::new(),
        }
    }
}

fn cents_to_major(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Builds the chart series for grouped sales.
///
/// - Grouping by color looks the label up in the palette's color map so the
///   bar matches the garment; everything else rotates through the series
///   palette.
/// - Customer charts are truncated to the top 15 groups (the input is already
///   sorted); item/size/color charts render every group.
/// - The plotted value follows `sort_by`: net revenue in major units, net
///   quantity, or transaction count.
pub fn group_chart(
    groups: &[SaleGroup],
    group_by: GroupBy,
    sort_by: SortBy,
    palette: &Palette,
) -> ChartSeries {
    let limit = match group_by {
        GroupBy::Customer => CHART_TOP_CUSTOMERS,
        _ => usize::MAX,
    };

    let mut series = ChartSeries::empty();
    for (i, group) in groups.iter().take(limit).enumerate() {
        series.labels.push(group.label.clone());
        series.values.push(match sort_by {
            SortBy::NetRevenue => cents_to_major(group.net_revenue().cents()),
            SortBy::NetQuantity => group.net_quantity() as f64,
            SortBy::Transactions => group.transaction_count() as f64,
        });
        let color = match group_by {
            GroupBy::Color => palette.color_for_name(&group.label),
            _ => palette.series_color(i),
        };
        series.colors.push(color.to_string());
    }
    series
}

// =============================================================================
// Sales by Customer
// =============================================================================

/// One row of the sales-by-customer report: the grouped sale figures joined
/// with the customer's payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub name: String,
    pub phone: String,
    #[serde(flatten)]
    pub group: SaleGroup,
    pub payments_cents: i64,
    /// net revenue − payments. Advances are deliberately excluded here;
    /// the account statement carries them.
    pub outstanding_cents: i64,
}

/// Joins customer sale groups with payment totals. Group order is preserved;
/// payments for customers with no sales are ignored, matching the report's
/// scope (it lists customers who bought something).
pub fn customer_rows(groups: &[SaleGroup], payments: &[Payment]) -> Vec<CustomerRow> {
    let mut paid: BTreeMap<String, i64> = BTreeMap::new();
    for p in payments {
        let key = format!("{}|{}", p.customer_name, p.customer_phone);
        *paid.entry(key).or_insert(0) += p.amount_cents;
    }

    groups
        .iter()
        .map(|g| {
            let (name, phone) = g
                .key
                .split_once('|')
                .map(|(n, p)| (n.to_string(), p.to_string()))
                .unwrap_or_else(|| (g.label.clone(), String::new()));
            let payments_cents = paid.get(&g.key).copied().unwrap_or(0);
            let outstanding_cents = g.net_revenue().cents() - payments_cents;
            CustomerRow {
                name,
                phone,
                group: g.clone(),
                payments_cents,
                outstanding_cents,
            }
        })
        .collect()
}

// =============================================================================
// Profit Report
// =============================================================================

/// Per-stock-line profit figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockProfit {
    pub size: String,
    pub color: String,
    pub profit_cents: i64,
    pub revenue_cents: i64,
    pub cost_cents: i64,
    pub sales_count: i64,
    /// profit / revenue in basis points; 0 when revenue ≤ 0.
    pub margin_bps: i64,
}

impl StockProfit {
    pub fn label(&self) -> String {
        format!("{} {}", self.size, self.color)
    }
}

/// Profit/revenue/cost for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFigures {
    /// `YYYY-MM`.
    pub month: String,
    pub profit_cents: i64,
    pub revenue_cents: i64,
    pub cost_cents: i64,
}

/// The full profit report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitReport {
    pub total_profit_cents: i64,
    pub total_revenue_cents: i64,
    pub total_cost_cents: i64,
    pub total_payments_cents: i64,
    /// payments received − total cost.
    pub cash_flow_cents: i64,
    /// Overall profit margin in basis points.
    pub margin_bps: i64,
    /// Per stock line, sorted by profit descending.
    pub by_stock: Vec<StockProfit>,
    /// Chronological monthly trend.
    pub monthly: Vec<MonthlyFigures>,
    pub profitable_items: usize,
    pub loss_making_items: usize,
    pub break_even_items: usize,
    /// Up to three most profitable lines.
    pub top_profitable: Vec<StockProfit>,
    /// Up to three worst loss-making lines, worst first.
    pub worst_loss: Vec<StockProfit>,
}

/// Assembles the profit report from raw sale and payment rows.
///
/// ## Sign Handling
/// Refund rows carry positive revenue/cost figures, so those are negated
/// here before accumulation. `profit_cents` is already negated at write
/// time and sums plainly.
pub fn profit_report(sales: &[Sale], payments: &[Payment]) -> ProfitReport {
    let mut total_profit = 0i64;
    let mut total_revenue = 0i64;
    let mut total_cost = 0i64;

    // Insertion-order buckets per stock line, month buckets sorted by key.
    let mut stock_order: Vec<String> = Vec::new();
    let mut by_stock: BTreeMap<String, StockProfit> = BTreeMap::new();
    let mut monthly: BTreeMap<String, MonthlyFigures> = BTreeMap::new();

    for sale in sales {
        let sign = if sale.is_refund { -1 } else { 1 };
        let profit = sale.profit_cents;
        let revenue = sign * sale.total_cents;
        let cost = sign * sale.total_cost_cents;

        total_profit += profit;
        total_revenue += revenue;
        total_cost += cost;

        let month = sale.date.format("%Y-%m").to_string();
        let m = monthly.entry(month.clone()).or_insert(MonthlyFigures {
            month,
            profit_cents: 0,
            revenue_cents: 0,
            cost_cents: 0,
        });
        m.profit_cents += profit;
        m.revenue_cents += revenue;
        m.cost_cents += cost;

        let key = format!("{}_{}", sale.stock_size, sale.stock_color);
        let entry = by_stock.entry(key.clone()).or_insert_with(|| {
            stock_order.push(key);
            StockProfit {
                size: sale.stock_size.clone(),
                color: sale.stock_color.clone(),
                profit_cents: 0,
                revenue_cents: 0,
                cost_cents: 0,
                sales_count: 0,
                margin_bps: 0,
            }
        });
        entry.profit_cents += profit;
        entry.revenue_cents += revenue;
        entry.cost_cents += cost;
        entry.sales_count += 1;
    }

    let mut by_stock: Vec<StockProfit> = stock_order
        .iter()
        .filter_map(|key| by_stock.get(key).cloned())
        .collect();
    for s in &mut by_stock {
        s.margin_bps =
            Money::from_cents(s.profit_cents).ratio_bps(Money::from_cents(s.revenue_cents));
    }
    by_stock.sort_by_key(|s| std::cmp::Reverse(s.profit_cents));

    let total_payments: i64 = payments.iter().map(|p| p.amount_cents).sum();

    let profitable_items = by_stock.iter().filter(|s| s.profit_cents > 0).count();
    let loss_making_items = by_stock.iter().filter(|s| s.profit_cents < 0).count();
    let break_even_items = by_stock.iter().filter(|s| s.profit_cents == 0).count();

    // by_stock is already sorted descending, so the head gives the top lines
    let top_profitable: Vec<StockProfit> = by_stock
        .iter()
        .filter(|s| s.profit_cents > 0)
        .take(3)
        .cloned()
        .collect();
    let mut worst_loss: Vec<StockProfit> =
        by_stock.iter().filter(|s| s.profit_cents < 0).cloned().collect();
    worst_loss.sort_by_key(|s| s.profit_cents);
    worst_loss.truncate(3);

    ProfitReport {
        total_profit_cents: total_profit,
        total_revenue_cents: total_revenue,
        total_cost_cents: total_cost,
        total_payments_cents: total_payments,
        cash_flow_cents: total_payments - total_cost,
        margin_bps: Money::from_cents(total_profit).ratio_bps(Money::from_cents(total_revenue)),
        by_stock,
        monthly: monthly.into_values().collect(),
        profitable_items,
        loss_making_items,
        break_even_items,
        top_profitable,
        worst_loss,
    }
}

/// Chart series for the profit report: the top 8 stock lines by profit,
/// green bars for profit and red for loss.
pub fn profit_chart(report: &ProfitReport, palette: &Palette) -> ChartSeries {
    let mut series = ChartSeries::empty();
    for stock in report.by_stock.iter().take(CHART_TOP_ITEMS) {
        series.labels.push(stock.label());
        series.values.push(cents_to_major(stock.profit_cents));
        series
            .colors
            .push(palette.profit_color(stock.profit_cents).to_string());
    }
    series
}

/// Monthly trend series for the profit report: chronological labels plus
/// parallel profit and revenue values in major units.
pub fn monthly_trend(report: &ProfitReport) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let labels = report.monthly.iter().map(|m| m.month.clone()).collect();
    let profits = report
        .monthly
        .iter()
        .map(|m| cents_to_major(m.profit_cents))
        .collect();
    let revenues = report
        .monthly
        .iter()
        .map(|m| cents_to_major(m.revenue_cents))
        .collect();
    (labels, profits, revenues)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::group_sales;
    use chrono::{TimeZone, Utc};

    fn sale(
        size: &str,
        color: &str,
        total: i64,
        cost: i64,
        profit: i64,
        is_refund: bool,
        month: u32,
    ) -> Sale {
        Sale {
            sale_id: 1,
            customer_name: "Asha".to_string(),
            customer_phone: "0301".to_string(),
            stock_size: size.to_string(),
            stock_color: color.to_string(),
            quantity: 1,
            rate_cents: total,
            total_cents: total,
            cost_per_unit_cents: cost,
            total_cost_cents: cost,
            profit_cents: profit,
            is_refund,
            refund_of: None,
            date: Utc.with_ymd_and_hms(2024, month, 15, 12, 0, 0).unwrap(),
        }
    }

    fn payment(name: &str, phone: &str, amount: i64) -> Payment {
        Payment {
            payment_id: 1,
            customer_name: name.to_string(),
            customer_phone: phone.to_string(),
            amount_cents: amount,
            description: None,
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    // -------------------------------------------------------------------------
    // profit_report
    // -------------------------------------------------------------------------

    #[test]
    fn test_profit_report_totals_and_margin() {
        let sales = vec![
            sale("M", "Red", 2400, 1500, 900, false, 1),
            sale("M", "Red", 2400, 1500, -900, true, 2),
            sale("S", "Blue", 1000, 400, 600, false, 1),
        ];
        let payments = vec![payment("Asha", "0301", 500)];

        let report = profit_report(&sales, &payments);

        // Refund cancels the first sale's revenue and cost; profit sums plainly.
        assert_eq!(report.total_revenue_cents, 1000);
        assert_eq!(report.total_cost_cents, 400);
        assert_eq!(report.total_profit_cents, 600);
        assert_eq!(report.total_payments_cents, 500);
        assert_eq!(report.cash_flow_cents, 100);
        // 600 / 1000 = 60.00%
        assert_eq!(report.margin_bps, 6000);
    }

    #[test]
    fn test_profit_report_by_stock_sorted_descending() {
        let sales = vec![
            sale("M", "Red", 1000, 900, 100, false, 1),
            sale("S", "Blue", 1000, 200, 800, false, 1),
            sale("L", "Green", 500, 700, -200, false, 1),
        ];

        let report = profit_report(&sales, &[]);
        let labels: Vec<String> = report.by_stock.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["S Blue", "M Red", "L Green"]);

        assert_eq!(report.profitable_items, 2);
        assert_eq!(report.loss_making_items, 1);
        assert_eq!(report.break_even_items, 0);
        assert_eq!(report.top_profitable[0].label(), "S Blue");
        assert_eq!(report.worst_loss[0].label(), "L Green");
    }

    #[test]
    fn test_profit_report_monthly_trend_chronological() {
        let sales = vec![
            sale("M", "Red", 1000, 500, 500, false, 3),
            sale("M", "Red", 1000, 500, 500, false, 1),
            sale("M", "Red", 2000, 500, 1500, false, 3),
        ];

        let report = profit_report(&sales, &[]);
        let (labels, profits, revenues) = monthly_trend(&report);
        assert_eq!(labels, vec!["2024-01", "2024-03"]);
        assert_eq!(profits, vec![5.0, 20.0]);
        assert_eq!(revenues, vec![10.0, 30.0]);
    }

    #[test]
    fn test_profit_report_margin_zero_when_no_revenue() {
        let sales = vec![
            sale("M", "Red", 1000, 500, 500, false, 1),
            sale("M", "Red", 1000, 500, -500, true, 1),
        ];
        let report = profit_report(&sales, &[]);
        assert_eq!(report.total_revenue_cents, 0);
        assert_eq!(report.margin_bps, 0);
    }

    // -------------------------------------------------------------------------
    // customer_rows
    // -------------------------------------------------------------------------

    #[test]
    fn test_customer_rows_join_payments() {
        let sales = vec![
            sale("M", "Red", 5000, 2000, 3000, false, 1),
            sale("M", "Red", 1000, 400, -600, true, 1),
        ];
        let groups = group_sales(&sales, GroupBy::Customer, SortBy::NetRevenue);
        let rows = customer_rows(&groups, &[payment("Asha", "0301", 1500)]);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Asha");
        assert_eq!(row.phone, "0301");
        assert_eq!(row.payments_cents, 1500);
        // net revenue 4000 − payments 1500
        assert_eq!(row.outstanding_cents, 2500);
    }

    #[test]
    fn test_customer_rows_ignore_payments_without_sales() {
        let sales = vec![sale("M", "Red", 5000, 2000, 3000, false, 1)];
        let groups = group_sales(&sales, GroupBy::Customer, SortBy::NetRevenue);
        let rows = customer_rows(&groups, &[payment("Bilal", "0302", 9999)]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].payments_cents, 0);
    }

    // -------------------------------------------------------------------------
    // chart series
    // -------------------------------------------------------------------------

    #[test]
    fn test_group_chart_color_grouping_uses_color_map() {
        let sales = vec![
            sale("M", "Red", 2000, 500, 1500, false, 1),
            sale("M", "Mauve", 1000, 500, 500, false, 1),
        ];
        let groups = group_sales(&sales, GroupBy::Color, SortBy::NetRevenue);
        let palette = Palette::default();
        let series = group_chart(&groups, GroupBy::Color, SortBy::NetRevenue, &palette);

        assert_eq!(series.labels, vec!["Red", "Mauve"]);
        assert_eq!(series.values, vec![20.0, 10.0]);
        assert_eq!(series.colors, vec!["#FF4757", "#6c757d"]);
    }

    #[test]
    fn test_group_chart_customer_truncated_to_top_15() {
        let mut sales = Vec::new();
        for i in 0..20 {
            let mut s = sale("M", "Red", 1000 * (20 - i), 0, 0, false, 1);
            s.customer_name = format!("C{i}");
            s.customer_phone = format!("{i:04}");
            sales.push(s);
        }
        let groups = group_sales(&sales, GroupBy::Customer, SortBy::NetRevenue);
        let series = group_chart(
            &groups,
            GroupBy::Customer,
            SortBy::NetRevenue,
            &Palette::default(),
        );

        assert_eq!(series.labels.len(), 15);
        assert_eq!(series.labels[0], "C0");
    }

    #[test]
    fn test_group_chart_metric_follows_sort() {
        let sales = vec![sale("M", "Red", 2000, 500, 1500, false, 1)];
        let groups = group_sales(&sales, GroupBy::Item, SortBy::NetQuantity);
        let series = group_chart(
            &groups,
            GroupBy::Item,
            SortBy::NetQuantity,
            &Palette::default(),
        );
        assert_eq!(series.values, vec![1.0]);
    }

    #[test]
    fn test_profit_chart_top_8_with_profit_colors() {
        let mut sales = Vec::new();
        for i in 0..10 {
            let profit = if i == 0 { -500 } else { 1000 * i };
            sales.push(sale(&format!("S{i}"), "Red", 1000, 0, profit, false, 1));
        }
        let report = profit_report(&sales, &[]);
        let series = profit_chart(&report, &Palette::default());

        assert_eq!(series.labels.len(), 8);
        // Sorted descending by profit, so the loss-maker falls off the chart
        assert!(series.colors.iter().all(|c| c == "#28a745"));
        assert_eq!(series.labels[0], "S9 Red");
    }
}
