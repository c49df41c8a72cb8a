use std::env;

use thiserror::Error;
use tracing::info;

use smart_band_data::database::{DatabaseConfig, DatabaseError};
use smart_band_domain::auth::{AuthConfig, SecurityError};

/// Port the server listens on when `PORT` is not set
pub const DEFAULT_PORT: u16 = 5000;

/// Errors raised while reading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Database configuration error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Auth configuration error: {0}")]
    Auth(#[from] SecurityError),

    #[error("{0} has an invalid value: {1}")]
    InvalidValue(&'static str, String),
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to bind on all interfaces
    pub port: u16,
    /// Prefix of the URL encoded into patient QR codes
    pub qr_base_url: String,
    /// Deployment name reported by `/health`
    pub environment: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Read `PORT`, `QR_BASE_URL`, `APP_ENV` and the database and auth settings
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue("PORT", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let qr_base_url = env::var("QR_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));
        if !qr_base_url.starts_with("http://") && !qr_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue("QR_BASE_URL", qr_base_url));
        }

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Self {
            port,
            qr_base_url,
            environment,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
        };

        info!(
            "Configuration loaded: port={}, environment={}, auth_enabled={}",
            config.port, config.environment, config.auth.enabled
        );

        Ok(config)
    }
}
