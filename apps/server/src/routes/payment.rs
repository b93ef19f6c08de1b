//! Payment and advance route handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use stockbook_core::validation::validate_payment_amount;
use stockbook_db::{NewAdvance, NewPayment};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_cents: i64,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdvanceRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_cents: i64,
    pub note: Option<String>,
}

/// GET /api/payments?name=&phone=
///
/// Lists all payments, or one customer's when both key halves are given.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
) -> ServerResult<Json<serde_json::Value>> {
    let payments = match (query.name.as_deref(), query.phone.as_deref()) {
        (Some(name), Some(phone)) => state.db.payments().list_for_customer(name, phone).await?,
        _ => state.db.payments().list().await?,
    };
    Ok(Json(json!({ "success": true, "data": payments })))
}

/// POST /api/payments
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    validate_payment_amount(body.amount_cents)
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let payment = state
        .db
        .payments()
        .record(&NewPayment {
            customer_name: body.customer_name,
            customer_phone: body.customer_phone,
            amount_cents: body.amount_cents,
            description: body.description,
        })
        .await?;

    Ok(Json(json!({ "success": true, "data": payment })))
}

/// POST /api/payments/advance
///
/// Records an advance: credit handed over before any sale. Lives only in
/// the ledger and raises the customer's balance.
pub async fn advance(
    State(state): State<AppState>,
    Json(body): Json<CreateAdvanceRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    validate_payment_amount(body.amount_cents)
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let entry = state
        .db
        .ledger()
        .record_advance(&NewAdvance {
            customer_name: body.customer_name,
            customer_phone: body.customer_phone,
            amount_cents: body.amount_cents,
            note: body.note,
        })
        .await?;

    Ok(Json(json!({ "success": true, "data": entry })))
}

/// DELETE /api/payments/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
) -> ServerResult<Json<serde_json::Value>> {
    state.db.payments().delete(payment_id).await?;
    Ok(Json(json!({ "success": true })))
}
