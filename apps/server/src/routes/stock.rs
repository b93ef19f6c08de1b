//! Stock route handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use stockbook_core::validation::{validate_amount_cents, validate_color, validate_quantity, validate_size};
use stockbook_core::{Money, StockItem};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Composite key for a stock line, taken from query parameters.
#[derive(Debug, Deserialize)]
pub struct StockKey {
    pub size: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveStockRequest {
    pub size: String,
    pub color: String,
    pub quantity: i64,
    pub total_cost_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub size: String,
    pub color: String,
    pub quantity: i64,
    pub cost_per_unit_cents: i64,
}

/// GET /api/stock
pub async fn list(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    let items = state.db.stock().list().await?;
    Ok(Json(json!({ "success": true, "data": items })))
}

/// POST /api/stock
///
/// Receives stock, merging into the existing line with weighted-average
/// unit cost.
pub async fn receive(
    State(state): State<AppState>,
    Json(body): Json<ReceiveStockRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    validate_size(&body.size).map_err(|e| ServerError::Validation(e.to_string()))?;
    validate_color(&body.color).map_err(|e| ServerError::Validation(e.to_string()))?;
    validate_quantity(body.quantity).map_err(|e| ServerError::Validation(e.to_string()))?;
    validate_amount_cents(body.total_cost_cents)
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let item = state
        .db
        .stock()
        .receive(
            body.size.trim(),
            body.color.trim(),
            body.quantity,
            Money::from_cents(body.total_cost_cents),
        )
        .await?;

    Ok(Json(json!({ "success": true, "data": item })))
}

/// PUT /api/stock
///
/// Overwrites a line's quantity and unit cost (the edit page). Total cost
/// is recomputed from the pair.
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<UpdateStockRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    validate_amount_cents(body.cost_per_unit_cents)
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let item = StockItem {
        size: body.size,
        color: body.color,
        quantity: body.quantity,
        cost_per_unit_cents: body.cost_per_unit_cents,
        total_cost_cents: body.cost_per_unit_cents * body.quantity,
    };
    state.db.stock().update_line(&item).await?;

    Ok(Json(json!({ "success": true, "data": item })))
}

/// DELETE /api/stock?size=&color=
pub async fn remove(
    State(state): State<AppState>,
    Query(key): Query<StockKey>,
) -> ServerResult<Json<serde_json::Value>> {
    state.db.stock().delete(&key.size, &key.color).await?;
    Ok(Json(json!({ "success": true })))
}
