//! Report route handlers. Every report comes in two flavours: a JSON payload
//! carrying the rows plus a ready-to-plot chart series, and a `/pdf` variant
//! returning the same data as a printable document.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use stockbook_core::ledger::{customer_balance, group_sales};
use stockbook_core::reports::{
    customer_rows, group_chart, monthly_trend, profit_chart, profit_report,
};
use stockbook_core::{GroupBy, SortBy};

use crate::error::{ServerError, ServerResult};
use crate::pdf;
use crate::routes::customer::CustomerKey;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GroupQuery {
    #[serde(default)]
    pub group_by: GroupBy,
    #[serde(default)]
    pub sort_by: SortBy,
}

#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    #[serde(default)]
    pub sort_by: SortBy,
}

/// Wraps rendered PDF bytes in a download response.
fn pdf_response(filename: &str, bytes: Vec<u8>) -> ServerResult<Response<Body>> {
    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| ServerError::Internal(e.to_string()))
}

// =============================================================================
// Account Statement
// =============================================================================

struct Statement {
    customer: stockbook_core::Customer,
    sales: Vec<stockbook_core::Sale>,
    payments: Vec<stockbook_core::Payment>,
    ledger: Vec<stockbook_core::LedgerEntry>,
    balance_cents: i64,
}

async fn load_statement(state: &AppState, key: &CustomerKey) -> ServerResult<Statement> {
    let customer = state
        .db
        .customers()
        .get(&key.name, &key.phone)
        .await?
        .ok_or_else(|| {
            ServerError::Db(stockbook_db::DbError::not_found(
                "Customer",
                format!("{} ({})", key.name, key.phone),
            ))
        })?;

    let sales = state
        .db
        .sales()
        .list_for_customer(&key.name, &key.phone)
        .await?;
    let payments = state
        .db
        .payments()
        .list_for_customer(&key.name, &key.phone)
        .await?;
    let ledger = state
        .db
        .ledger()
        .list_for_customer(&key.name, &key.phone)
        .await?;
    let balance = customer_balance(&sales, &payments, &ledger);

    Ok(Statement {
        customer,
        sales,
        payments,
        ledger,
        balance_cents: balance.cents(),
    })
}

/// GET /api/reports/account?name=&phone=
pub async fn account(
    State(state): State<AppState>,
    Query(key): Query<CustomerKey>,
) -> ServerResult<Json<serde_json::Value>> {
    let s = load_statement(&state, &key).await?;
    Ok(Json(json!({
        "success": true,
        "data": {
            "customer": s.customer,
            "sales": s.sales,
            "payments": s.payments,
            "ledger": s.ledger,
            "balance_cents": s.balance_cents,
        }
    })))
}

/// GET /api/reports/account/pdf?name=&phone=
pub async fn account_pdf(
    State(state): State<AppState>,
    Query(key): Query<CustomerKey>,
) -> ServerResult<Response<Body>> {
    let s = load_statement(&state, &key).await?;
    let currency = state.config.currency_symbol.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        pdf::account_statement(
            &s.customer,
            &s.sales,
            &s.payments,
            &s.ledger,
            s.balance_cents,
            &currency,
        )
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    pdf_response("account_statement.pdf", bytes)
}

// =============================================================================
// Sales by Stock
// =============================================================================

/// GET /api/reports/sales-by-stock?group_by=&sort_by=
pub async fn sales_by_stock(
    State(state): State<AppState>,
    Query(query): Query<GroupQuery>,
) -> ServerResult<Json<serde_json::Value>> {
    let sales = state.db.sales().list().await?;
    let groups = group_sales(&sales, query.group_by, query.sort_by);
    let chart = group_chart(&groups, query.group_by, query.sort_by, &state.palette);

    Ok(Json(json!({
        "success": true,
        "data": { "groups": groups, "chart": chart }
    })))
}

/// GET /api/reports/sales-by-stock/pdf?group_by=&sort_by=
pub async fn sales_by_stock_pdf(
    State(state): State<AppState>,
    Query(query): Query<GroupQuery>,
) -> ServerResult<Response<Body>> {
    let sales = state.db.sales().list().await?;
    let groups = group_sales(&sales, query.group_by, query.sort_by);
    let currency = state.config.currency_symbol.clone();
    let bytes =
        tokio::task::spawn_blocking(move || pdf::sales_by_stock(&groups, query.group_by, &currency))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))??;

    pdf_response("sales_by_stock.pdf", bytes)
}

// =============================================================================
// Sales by Customer
// =============================================================================

/// GET /api/reports/sales-by-customer?sort_by=
pub async fn sales_by_customer(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> ServerResult<Json<serde_json::Value>> {
    let sales = state.db.sales().list().await?;
    let payments = state.db.payments().list().await?;
    let groups = group_sales(&sales, GroupBy::Customer, query.sort_by);
    let rows = customer_rows(&groups, &payments);
    let chart = group_chart(&groups, GroupBy::Customer, query.sort_by, &state.palette);

    Ok(Json(json!({
        "success": true,
        "data": { "customers": rows, "chart": chart }
    })))
}

/// GET /api/reports/sales-by-customer/pdf?sort_by=
pub async fn sales_by_customer_pdf(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> ServerResult<Response<Body>> {
    let sales = state.db.sales().list().await?;
    let payments = state.db.payments().list().await?;
    let groups = group_sales(&sales, GroupBy::Customer, query.sort_by);
    let rows = customer_rows(&groups, &payments);
    let currency = state.config.currency_symbol.clone();
    let bytes = tokio::task::spawn_blocking(move || pdf::sales_by_customer(&rows, &currency))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    pdf_response("sales_by_customer.pdf", bytes)
}

// =============================================================================
// Profit
// =============================================================================

/// GET /api/reports/profit
pub async fn profit(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    let sales = state.db.sales().list().await?;
    let payments = state.db.payments().list().await?;
    let report = profit_report(&sales, &payments);
    let chart = profit_chart(&report, &state.palette);
    let (months, profits, revenues) = monthly_trend(&report);

    Ok(Json(json!({
        "success": true,
        "data": {
            "report": report,
            "chart": chart,
            "trend": { "months": months, "profits": profits, "revenues": revenues },
        }
    })))
}

/// GET /api/reports/profit/pdf
pub async fn profit_pdf(State(state): State<AppState>) -> ServerResult<Response<Body>> {
    let sales = state.db.sales().list().await?;
    let payments = state.db.payments().list().await?;
    let report = profit_report(&sales, &payments);
    let currency = state.config.currency_symbol.clone();
    let bytes = tokio::task::spawn_blocking(move || pdf::profit(&report, &currency))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    pdf_response("profit_report.pdf", bytes)
}
