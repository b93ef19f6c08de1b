//! Route registration for the Stockbook API.
//!
//! ## Route Map
//! ```text
//! POST   /api/auth/login                      password → JWT
//!
//! GET    /api/stock                           list stock lines
//! POST   /api/stock                           receive stock (merge)
//! PUT    /api/stock                           overwrite a line
//! DELETE /api/stock                           delete a line
//!
//! GET    /api/customers                       list / search customers
//! POST   /api/customers                       add customer
//! PUT    /api/customers/company               update company
//! DELETE /api/customers                       delete customer
//! GET    /api/customers/account               account statement
//!
//! GET    /api/sales                           list sale rows
//! POST   /api/sales                           record sale
//! POST   /api/sales/:id/refund                refund a sale
//! DELETE /api/sales/:id                       delete sale/refund row
//!
//! GET    /api/payments                        list payments
//! POST   /api/payments                        record payment
//! POST   /api/payments/advance                record advance
//! DELETE /api/payments/:id                    delete payment
//!
//! GET    /api/reports/account[/pdf]           per-customer statement
//! GET    /api/reports/sales-by-stock[/pdf]    grouped by item/size/color
//! GET    /api/reports/sales-by-customer[/pdf] grouped by customer
//! GET    /api/reports/profit[/pdf]            profit analysis
//!
//! GET    /api/dashboard                       landing page figures
//! GET    /health                              liveness probe
//! ```

pub mod customer;
pub mod dashboard;
pub mod payment;
pub mod reports;
pub mod sale;
pub mod stock;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::auth;
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/api/auth/login", post(auth::login))
        // Stock
        .route("/api/stock", get(stock::list))
        .route("/api/stock", post(stock::receive))
        .route("/api/stock", put(stock::update))
        .route("/api/stock", delete(stock::remove))
        // Customers
        .route("/api/customers", get(customer::list))
        .route("/api/customers", post(customer::create))
        .route("/api/customers/company", put(customer::update_company))
        .route("/api/customers", delete(customer::remove))
        .route("/api/customers/account", get(customer::account))
        // Sales
        .route("/api/sales", get(sale::list))
        .route("/api/sales", post(sale::create))
        .route("/api/sales/:id/refund", post(sale::refund))
        .route("/api/sales/:id", delete(sale::remove))
        // Payments
        .route("/api/payments", get(payment::list))
        .route("/api/payments", post(payment::create))
        .route("/api/payments/advance", post(payment::advance))
        .route("/api/payments/:id", delete(payment::remove))
        // Reports
        .route("/api/reports/account", get(reports::account))
        .route("/api/reports/account/pdf", get(reports::account_pdf))
        .route("/api/reports/sales-by-stock", get(reports::sales_by_stock))
        .route(
            "/api/reports/sales-by-stock/pdf",
            get(reports::sales_by_stock_pdf),
        )
        .route(
            "/api/reports/sales-by-customer",
            get(reports::sales_by_customer),
        )
        .route(
            "/api/reports/sales-by-customer/pdf",
            get(reports::sales_by_customer_pdf),
        )
        .route("/api/reports/profit", get(reports::profit))
        .route("/api/reports/profit/pdf", get(reports::profit_pdf))
        // Dashboard
        .route("/api/dashboard", get(dashboard::stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
