//! ╔══════════════════════════════════════════════════════════════════════╗
//! ║ PDF Rendering                                                        ║
//! ║                                                                      ║
//! ║ Printable versions of the four reports. Everything here is plain     ║
//! ║ synchronous CPU work; route handlers call these from                 ║
//! ║ `spawn_blocking`. Output is an in-memory byte buffer, never a file.  ║
//! ╚══════════════════════════════════════════════════════════════════════╝

use std::io::BufWriter;

use printpdf::*;

use stockbook_core::reports::{CustomerRow, ProfitReport};
use stockbook_core::{Customer, GroupBy, LedgerEntry, Money, Payment, Sale, SaleGroup};

use crate::error::{ServerError, ServerResult};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 15.0;
const CONTENT_W: f32 = 180.0;
const TOP_Y: f32 = 275.0;
const BOTTOM_Y: f32 = 20.0;

/// Formats cents as `Rs. 1,234.50`.
fn fmt_money(cents: i64, currency: &str) -> String {
    let money = Money::from_cents(cents);
    let plain = money.to_string();
    let (major, minor) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let negative = major.starts_with('-');
    let digits = major.trim_start_matches('-');

    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    let sign = if negative { "-" } else { "" };
    format!("{currency} {sign}{grouped}.{minor}")
}

/// Cursor over an A4 document. Tracks the current layer and vertical
/// position, adding pages as rows run past the bottom margin.
struct Page {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Page {
    fn new(title: &str) -> ServerResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ServerError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ServerError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Page {
            doc,
            layer,
            font,
            bold,
            y: TOP_Y,
        })
    }

    fn text(&self, x: f32, size: f32, txt: &str) {
        self.layer.use_text(txt, size, Mm(x), Mm(self.y), &self.font);
    }

    fn text_bold(&self, x: f32, size: f32, txt: &str) {
        self.layer.use_text(txt, size, Mm(x), Mm(self.y), &self.bold);
    }

    fn rule(&self) {
        let line = Line::from_iter(vec![
            (Point::new(Mm(MARGIN_X), Mm(self.y)), false),
            (Point::new(Mm(MARGIN_X + CONTENT_W), Mm(self.y)), false),
        ]);
        self.layer.add_line(line);
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
        if self.y < BOTTOM_Y {
            let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
        }
    }

    fn title(&mut self, heading: &str, subtitle: &str) {
        self.text_bold(MARGIN_X, 18.0, heading);
        self.advance(8.0);
        self.text(MARGIN_X, 10.0, subtitle);
        self.advance(6.0);
        self.rule();
        self.advance(10.0);
    }

    fn table_header(&mut self, columns: &[(&str, f32)]) {
        let mut cx = MARGIN_X;
        for (label, width) in columns {
            self.text_bold(cx, 9.0, label);
            cx += width;
        }
        self.advance(3.0);
        self.rule();
        self.advance(6.0);
    }

    fn table_row(&mut self, cells: &[String], widths: &[f32]) {
        let mut cx = MARGIN_X;
        for (cell, width) in cells.iter().zip(widths) {
            self.text(cx, 8.0, &truncate(cell, 28));
            cx += width;
        }
        self.advance(5.5);
    }

    fn summary_row(&mut self, label: &str, value: &str) {
        self.text(MARGIN_X + 5.0, 10.0, label);
        self.text(MARGIN_X + 110.0, 10.0, value);
        self.advance(7.0);
    }

    fn finish(self) -> ServerResult<Vec<u8>> {
        self.layer.use_text(
            format!(
                "Generated {} | StockBook",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            8.0,
            Mm(MARGIN_X),
            Mm(10.0),
            &self.font,
        );
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| ServerError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| ServerError::Pdf(e.to_string()))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max - 2).collect::<String>() + ".."
    } else {
        s.to_string()
    }
}

// =============================================================================
// Account Statement
// =============================================================================

pub fn account_statement(
    customer: &Customer,
    sales: &[Sale],
    payments: &[Payment],
    ledger: &[LedgerEntry],
    balance_cents: i64,
    currency: &str,
) -> ServerResult<Vec<u8>> {
    let mut page = Page::new("Account Statement")?;
    page.title(
        "Account Statement",
        &format!("{} ({})", customer.name, customer.phone),
    );

    if let Some(company) = customer.company.as_deref() {
        page.text(MARGIN_X, 10.0, &format!("Company: {company}"));
        page.advance(8.0);
    }

    let total_sales: i64 = sales
        .iter()
        .filter(|s| !s.is_refund)
        .map(|s| s.total_cents)
        .sum();
    let total_refunds: i64 = sales
        .iter()
        .filter(|s| s.is_refund)
        .map(|s| s.total_cents)
        .sum();
    let total_payments: i64 = payments.iter().map(|p| p.amount_cents).sum();

    page.summary_row("Total sales", &fmt_money(total_sales, currency));
    page.summary_row("Total refunds", &fmt_money(total_refunds, currency));
    page.summary_row("Total payments", &fmt_money(total_payments, currency));
    page.text_bold(MARGIN_X + 5.0, 11.0, "Outstanding balance");
    page.text_bold(MARGIN_X + 110.0, 11.0, &fmt_money(balance_cents, currency));
    page.advance(12.0);

    page.text_bold(MARGIN_X, 12.0, "Ledger");
    page.advance(7.0);
    let widths = [25.0, 22.0, 98.0, 35.0];
    page.table_header(&[
        ("Date", widths[0]),
        ("Type", widths[1]),
        ("Note", widths[2]),
        ("Amount", widths[3]),
    ]);
    for entry in ledger {
        page.table_row(
            &[
                entry.date.format("%Y-%m-%d").to_string(),
                entry.kind.to_string(),
                entry.note.clone().unwrap_or_default(),
                fmt_money(entry.amount_cents, currency),
            ],
            &widths,
        );
    }

    page.finish()
}

// =============================================================================
// Sales by Stock
// =============================================================================

pub fn sales_by_stock(
    groups: &[SaleGroup],
    group_by: GroupBy,
    currency: &str,
) -> ServerResult<Vec<u8>> {
    let grouping = match group_by {
        GroupBy::Customer => "customer",
        GroupBy::Item => "item",
        GroupBy::Size => "size",
        GroupBy::Color => "color",
    };
    let mut page = Page::new("Sales by Stock")?;
    page.title("Sales Report", &format!("Grouped by {grouping}"));

    let widths = [55.0, 22.0, 22.0, 42.0, 39.0];
    page.table_header(&[
        ("Item", widths[0]),
        ("Sold", widths[1]),
        ("Refunded", widths[2]),
        ("Net Revenue", widths[3]),
        ("Profit", widths[4]),
    ]);
    for group in groups {
        page.table_row(
            &[
                group.label.clone(),
                group.quantity_sold.to_string(),
                group.quantity_refunded.to_string(),
                fmt_money(group.net_revenue().cents(), currency),
                fmt_money(group.profit_cents, currency),
            ],
            &widths,
        );
    }

    let net_revenue: i64 = groups.iter().map(|g| g.net_revenue().cents()).sum();
    let profit: i64 = groups.iter().map(|g| g.profit_cents).sum();
    page.advance(4.0);
    page.rule();
    page.advance(7.0);
    page.summary_row("Total net revenue", &fmt_money(net_revenue, currency));
    page.summary_row("Total profit", &fmt_money(profit, currency));

    page.finish()
}

// =============================================================================
// Sales by Customer
// =============================================================================

pub fn sales_by_customer(rows: &[CustomerRow], currency: &str) -> ServerResult<Vec<u8>> {
    let mut page = Page::new("Sales by Customer")?;
    page.title("Customer Sales Report", "All customers with recorded sales");

    let widths = [55.0, 18.0, 40.0, 32.0, 35.0];
    page.table_header(&[
        ("Customer", widths[0]),
        ("Units", widths[1]),
        ("Net Revenue", widths[2]),
        ("Paid", widths[3]),
        ("Outstanding", widths[4]),
    ]);
    for row in rows {
        page.table_row(
            &[
                row.name.clone(),
                row.group.net_quantity().to_string(),
                fmt_money(row.group.net_revenue().cents(), currency),
                fmt_money(row.payments_cents, currency),
                fmt_money(row.outstanding_cents, currency),
            ],
            &widths,
        );
    }

    let outstanding: i64 = rows.iter().map(|r| r.outstanding_cents).sum();
    page.advance(4.0);
    page.rule();
    page.advance(7.0);
    page.summary_row("Total outstanding", &fmt_money(outstanding, currency));

    page.finish()
}

// =============================================================================
// Profit
// =============================================================================

pub fn profit(report: &ProfitReport, currency: &str) -> ServerResult<Vec<u8>> {
    let mut page = Page::new("Profit Report")?;
    page.title("Profit Report", "Net of refunds, cost on weighted average");

    page.summary_row(
        "Total revenue",
        &fmt_money(report.total_revenue_cents, currency),
    );
    page.summary_row("Total cost", &fmt_money(report.total_cost_cents, currency));
    page.summary_row(
        "Total profit",
        &fmt_money(report.total_profit_cents, currency),
    );
    page.summary_row(
        "Margin",
        &format!("{:.2}%", report.margin_bps as f64 / 100.0),
    );
    page.summary_row(
        "Payments received",
        &fmt_money(report.total_payments_cents, currency),
    );
    page.summary_row(
        "Cash flow (payments - cost)",
        &fmt_money(report.cash_flow_cents, currency),
    );
    page.summary_row(
        "Profitable / loss / break-even lines",
        &format!(
            "{} / {} / {}",
            report.profitable_items, report.loss_making_items, report.break_even_items
        ),
    );
    page.advance(6.0);

    page.text_bold(MARGIN_X, 12.0, "By Stock Line");
    page.advance(7.0);
    let widths = [45.0, 38.0, 35.0, 38.0, 24.0];
    page.table_header(&[
        ("Item", widths[0]),
        ("Revenue", widths[1]),
        ("Cost", widths[2]),
        ("Profit", widths[3]),
        ("Margin", widths[4]),
    ]);
    for line in &report.by_stock {
        page.table_row(
            &[
                line.label(),
                fmt_money(line.revenue_cents, currency),
                fmt_money(line.cost_cents, currency),
                fmt_money(line.profit_cents, currency),
                format!("{:.1}%", line.margin_bps as f64 / 100.0),
            ],
            &widths,
        );
    }

    if !report.monthly.is_empty() {
        page.advance(6.0);
        page.text_bold(MARGIN_X, 12.0, "Monthly Trend");
        page.advance(7.0);
        let widths = [35.0, 50.0, 50.0, 45.0];
        page.table_header(&[
            ("Month", widths[0]),
            ("Revenue", widths[1]),
            ("Cost", widths[2]),
            ("Profit", widths[3]),
        ]);
        for month in &report.monthly {
            page.table_row(
                &[
                    month.month.clone(),
                    fmt_money(month.revenue_cents, currency),
                    fmt_money(month.cost_cents, currency),
                    fmt_money(month.profit_cents, currency),
                ],
                &widths,
            );
        }
    }

    page.finish()
}

// =============================================================================
// Tests
// =============================================================================
