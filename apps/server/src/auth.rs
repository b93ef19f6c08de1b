//! JWT authentication: login handler, token issue/verify, and the bearer
//! middleware guarding every /api route.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/auth/login { password }                                      │
//! │       │  argon2 verify against startup hash                             │
//! │       ▼                                                                 │
//! │  { success: true, token: "<jwt>" }                                      │
//! │                                                                         │
//! │  Every other /api request:                                              │
//! │    Authorization: Bearer <jwt>                                          │
//! │       │  decode + expiry check                                          │
//! │       ▼                                                                 │
//! │  Claims inserted into request extensions                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Routes reachable without a token.
const PUBLIC_ROUTES: &[&str] = &["/api/auth/login", "/health"];

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; always "admin" in the single-user deployment
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issues a signed token for the admin principal.
pub fn issue_token(state: &AppState) -> ServerResult<String> {
    let now = Utc::now();
    let exp = now + Duration::seconds(state.config.jwt_lifetime_secs);

    let claims = Claims {
        sub: "admin".to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ServerError::Internal(format!("Failed to sign token: {e}")))
}

/// Decodes and validates a token, returning its claims.
pub fn verify_token(state: &AppState, token: &str) -> ServerResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ServerError::Auth("Invalid or expired token".to_string()))
}

// =============================================================================
// Login Handler
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// POST /api/auth/login
///
/// Verifies the admin password and issues a token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    let parsed = PasswordHash::new(&state.admin_hash)
        .map_err(|e| ServerError::Internal(format!("Corrupt admin hash: {e}")))?;

    if Argon2::default()
        .verify_password(body.password.as_bytes(), &parsed)
        .is_err()
    {
        tracing::warn!("Failed login attempt");
        return Err(ServerError::Auth("Incorrect password".to_string()));
    }

    let token = issue_token(&state)?;
    tracing::info!("Admin logged in");

    Ok(Json(json!({ "success": true, "token": token })))
}

// =============================================================================
// Middleware
// =============================================================================

/// Bearer-token middleware. Public routes pass through; everything else
/// needs a valid token, whose claims land in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let path = request.uri().path();
    if !path.starts_with("/api/") || PUBLIC_ROUTES.contains(&path) {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServerError::Auth("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ServerError::Auth("Expected Bearer token".to_string()))?;

    let claims = verify_token(&state, token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use stockbook_db::{Database, DbConfig};

    async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ServerConfig {
            port: 0,
            database_path: ":memory:".into(),
            jwt_secret: "test-secret".to_string(),
            jwt_lifetime_secs: 60,
            admin_password: "hunter2".to_string(),
            currency_symbol: "Rs.".to_string(),
            palette_path: None,
        };
        AppState::new(db, config).unwrap()
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let state = test_state().await;
        let token = issue_token(&state).unwrap();
        let claims = verify_token(&state, &token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let state = test_state().await;
        assert!(verify_token(&state, "not-a-token").is_err());
    }

    #[tokio::test]
    async fn test_token_from_other_secret_rejected() {
        let state = test_state().await;
        let token = issue_token(&state).unwrap();

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let other = AppState::new(
            db,
            ServerConfig {
                jwt_secret: "different".to_string(),
                ..(*state.config).clone()
            },
        )
        .unwrap();
        assert!(verify_token(&other, &token).is_err());
    }
}
