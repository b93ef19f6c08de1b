//! Customer route handlers, including the account statement.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use stockbook_core::ledger::customer_balance;
use stockbook_core::validation::{validate_customer_name, validate_phone, validate_search_query};
use stockbook_core::Customer;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Composite key for a customer, taken from query parameters.
#[derive(Debug, Deserialize)]
pub struct CustomerKey {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: String,
    pub phone: String,
    pub company: Option<String>,
}

/// GET /api/customers?q=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ServerResult<Json<serde_json::Value>> {
    let customers = match query.q.as_deref() {
        Some(q) => {
            let q = validate_search_query(q).map_err(|e| ServerError::Validation(e.to_string()))?;
            if q.is_empty() {
                state.db.customers().list().await?
            } else {
                state.db.customers().search(&q).await?
            }
        }
        None => state.db.customers().list().await?,
    };

    Ok(Json(json!({ "success": true, "data": customers })))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomerRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    validate_customer_name(&body.name).map_err(|e| ServerError::Validation(e.to_string()))?;
    validate_phone(&body.phone).map_err(|e| ServerError::Validation(e.to_string()))?;

    let customer = Customer {
        name: body.name.trim().to_string(),
        phone: body.phone.trim().to_string(),
        company: body.company.filter(|c| !c.trim().is_empty()),
    };
    state.db.customers().insert(&customer).await?;

    Ok(Json(json!({ "success": true, "data": customer })))
}

/// PUT /api/customers/company
pub async fn update_company(
    State(state): State<AppState>,
    Json(body): Json<UpdateCompanyRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    state
        .db
        .customers()
        .update_company(&body.name, &body.phone, body.company.as_deref())
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/customers?name=&phone=
pub async fn remove(
    State(state): State<AppState>,
    Query(key): Query<CustomerKey>,
) -> ServerResult<Json<serde_json::Value>> {
    state.db.customers().delete(&key.name, &key.phone).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/customers/account?name=&phone=
///
/// The full account statement: every sale, payment and ledger row plus the
/// running balance (sales − refunds − payments + advances).
pub async fn account(
    State(state): State<AppState>,
    Query(key): Query<CustomerKey>,
) -> ServerResult<Json<serde_json::Value>> {
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

    let sales = state.db.sales().list_for_customer(&key.name, &key.phone).await?;
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

    Ok(Json(json!({
        "success": true,
        "data": {
            "customer": customer,
            "sales": sales,
            "payments": payments,
            "ledger": ledger,
            "balance_cents": balance.cents(),
        }
    })))
}
