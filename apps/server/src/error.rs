//! Server error types and their HTTP mapping.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError / DbError                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServerError (this module)                                              │
//! │       │                                                                 │
//! │       ▼  IntoResponse                                                   │
//! │  JSON body: { "success": false, "error": "<message>" }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use stockbook_core::CoreError;
use stockbook_db::DbError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::Db(DbError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ServerError::Db(DbError::UniqueViolation { .. })
            | ServerError::Db(DbError::ForeignKeyViolation { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ServerError::Db(DbError::Core(ref core)) => {
                (core_status(core), self.to_string())
            }
            ServerError::Db(ref e) => {
                tracing::error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ServerError::Core(ref core) => (core_status(core), self.to_string()),
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ServerError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Pdf(ref msg) => {
                tracing::error!("PDF error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Report rendering failed".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::AlreadyRefund(_) | CoreError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found: ServerError = DbError::not_found("Sale", "7").into();
        assert_eq!(
            not_found.into_response().status(),
            StatusCode::NOT_FOUND
        );

        let refund: ServerError = CoreError::AlreadyRefund(7).into();
        assert_eq!(refund.into_response().status(), StatusCode::BAD_REQUEST);

        let auth = ServerError::Auth("bad token".to_string());
        assert_eq!(auth.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
