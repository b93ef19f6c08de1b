//! Shared application state handed to every handler.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};

use stockbook_core::palette::Palette;
use stockbook_db::Database;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Global application state.
///
/// Cloning is cheap: the database holds a pool and everything else is
/// behind an Arc.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub palette: Arc<Palette>,
    /// Argon2 hash of the admin password, computed once at startup so the
    /// plaintext never has to be compared directly per request.
    pub admin_hash: Arc<String>,
}

impl AppState {
    /// Builds the state: hashes the admin password and loads the palette
    /// override if one is configured.
    pub fn new(db: Database, config: ServerConfig) -> ServerResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let admin_hash = Argon2::default()
            .hash_password(config.admin_password.as_bytes(), &salt)
            .map_err(|e| ServerError::Internal(format!("Failed to hash admin password: {e}")))?
            .to_string();

        let palette = match &config.palette_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    ServerError::Internal(format!("Failed to read palette file: {e}"))
                })?;
                Palette::from_json(&json)
                    .map_err(|e| ServerError::Internal(format!("Invalid palette file: {e}")))?
            }
            None => Palette::default(),
        };

        Ok(AppState {
            db,
            config: Arc::new(config),
            palette: Arc::new(palette),
            admin_hash: Arc::new(admin_hash),
        })
    }
}
