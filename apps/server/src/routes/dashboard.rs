//! Dashboard summary handler.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use stockbook_core::LOW_STOCK_THRESHOLD;

use crate::error::ServerResult;
use crate::state::AppState;

/// GET /api/dashboard
///
/// The landing-page numbers: how many stock lines and customers exist, the
/// five most recent sales, lines running low, and the money tied up in
/// inventory at cost.
pub async fn stats(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    let stock = state.db.stock().list().await?;
    let customers = state.db.customers().list().await?;
    let sales = state.db.sales().list().await?;
    let low_stock = state.db.stock().low_stock(LOW_STOCK_THRESHOLD).await?;

    let total_units: i64 = stock.iter().map(|s| s.quantity).sum();
    let inventory_value: i64 = stock.iter().map(|s| s.total_cost_cents).sum();
    let recent: Vec<_> = sales.iter().take(5).collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "stock_lines": stock.len(),
            "total_units": total_units,
            "customer_count": customers.len(),
            "sale_count": sales.len(),
            "recent_sales": recent,
            "low_stock": low_stock,
            "inventory_value_cents": inventory_value,
        }
    })))
}
