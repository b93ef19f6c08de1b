//! Sale route handlers: record, refund, delete.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use stockbook_core::validation::{validate_amount_cents, validate_quantity};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub stock_size: String,
    pub stock_color: String,
    pub quantity: i64,
    pub rate_cents: i64,
}

/// GET /api/sales
pub async fn list(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    let sales = state.db.sales().list().await?;
    Ok(Json(json!({ "success": true, "data": sales })))
}

/// POST /api/sales
///
/// Records a sale. Overselling is allowed; the response carries a warning
/// when the stock line went negative.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateSaleRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    validate_quantity(body.quantity).map_err(|e| ServerError::Validation(e.to_string()))?;
    validate_amount_cents(body.rate_cents).map_err(|e| ServerError::Validation(e.to_string()))?;

    let recorded = state
        .db
        .sales()
        .record_sale(&stockbook_db::NewSale {
            customer_name: body.customer_name,
            customer_phone: body.customer_phone,
            stock_size: body.stock_size,
            stock_color: body.stock_color,
            quantity: body.quantity,
            rate_cents: body.rate_cents,
        })
        .await?;

    let warning = recorded.negative_stock.then(|| {
        format!(
            "Stock for {} {} is now negative",
            recorded.sale.stock_size, recorded.sale.stock_color
        )
    });

    Ok(Json(json!({
        "success": true,
        "data": recorded.sale,
        "warning": warning,
    })))
}

/// POST /api/sales/:id/refund
pub async fn refund(
    State(state): State<AppState>,
    Path(sale_id): Path<i64>,
) -> ServerResult<Json<serde_json::Value>> {
    let refund = state.db.sales().record_refund(sale_id).await?;
    Ok(Json(json!({ "success": true, "data": refund })))
}

/// DELETE /api/sales/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(sale_id): Path<i64>,
) -> ServerResult<Json<serde_json::Value>> {
    state.db.sales().delete(sale_id).await?;
    Ok(Json(json!({ "success": true })))
}
