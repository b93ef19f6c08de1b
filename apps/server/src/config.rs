//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file is honored in development via dotenvy.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Admin password for the single-user login
    pub admin_password: String,

    /// Currency symbol used in PDF reports
    pub currency_symbol: String,

    /// Optional JSON file overriding the chart palette
    pub palette_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "stockbook.db".to_string())
                .into(),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set, using insecure default");
                "stockbook-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "28800".to_string()) // 8 hours, one shop day
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            admin_password: env::var("ADMIN_PASSWORD")
                .map_err(|_| ConfigError::MissingRequired("ADMIN_PASSWORD".to_string()))?,

            currency_symbol: env::var("CURRENCY_SYMBOL").unwrap_or_else(|_| "Rs.".to_string()),

            palette_path: env::var("PALETTE_PATH").ok().map(PathBuf::from),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state, so everything lives in one test
    // to avoid racing parallel test threads.
    #[test]
    fn test_load_from_env() {
        std::env::remove_var("ADMIN_PASSWORD");
        assert!(matches!(
            ServerConfig::load(),
            Err(ConfigError::MissingRequired(_))
        ));

        std::env::set_var("ADMIN_PASSWORD", "secret");
        std::env::remove_var("PORT");
        std::env::remove_var("CURRENCY_SYMBOL");

        let config = ServerConfig::load().unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.currency_symbol, "Rs.");
        assert!(config.palette_path.is_none());
    }
}
