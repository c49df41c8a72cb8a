//! Authentication module for the SmartBand API
//!
//! Session tokens are HS256 JWTs carried in the `session` cookie or an
//! `Authorization: Bearer` header. [`gate::require_session`] guards the
//! patient and vitals routes.

use std::env;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

// JWT encoding and validation
pub mod token;

// Argon2 password hashing
pub mod password;

// Structured auth event logging
pub mod logging;

// Session middleware
pub mod gate;

// Signup and login
pub mod service;

pub use gate::{require_session, session_marker, CallerKind};
pub use service::{AuthService, AuthServiceTrait, LoginOutcome};
pub use token::SecurityError;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Authentication settings, read once at startup
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// When false the gate lets every request through
    pub enabled: bool,

    /// HMAC secret for session tokens
    pub jwt_secret: String,

    /// `iss` claim written and required on session tokens
    pub issuer: String,

    /// Lifetime of a session token
    pub session_ttl_minutes: i64,

    /// Where browsers are sent when they have no session
    pub login_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jwt_secret: String::new(),
            issuer: "smartband-api".to_string(),
            session_ttl_minutes: 480,
            login_path: "/login".to_string(),
        }
    }
}

impl AuthConfig {
    /// Load auth settings from environment variables.
    ///
    /// `JWT_SECRET` is mandatory unless `AUTH_ENABLED` is false.
    pub fn from_env() -> Result<Self, SecurityError> {
        let defaults = Self::default();

        let enabled = match env::var("AUTH_ENABLED") {
            Ok(value) => parse_bool(&value).ok_or_else(|| {
                SecurityError::ConfigError(format!("AUTH_ENABLED must be true or false, got {}", value))
            })?,
            Err(_) => defaults.enabled,
        };

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_default();
        if enabled && jwt_secret.is_empty() {
            return Err(SecurityError::ConfigError(
                "JWT_SECRET must be set when AUTH_ENABLED is true".to_string(),
            ));
        }

        let session_ttl_minutes = match env::var("SESSION_TTL_MINUTES") {
            Ok(value) => value.parse::<i64>().ok().filter(|m| *m > 0).ok_or_else(|| {
                SecurityError::ConfigError(format!("SESSION_TTL_MINUTES must be a positive integer, got {}", value))
            })?,
            Err(_) => defaults.session_ttl_minutes,
        };

        Ok(Self {
            enabled,
            jwt_secret,
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            session_ttl_minutes,
            login_path: env::var("LOGIN_PATH").unwrap_or(defaults.login_path),
        })
    }

    /// Wrap in an `Arc` for sharing through router state
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Login name
    pub username: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// The authenticated caller, inserted into request extensions by the gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

/// Configure CORS and security headers for the application
pub fn configure_auth(app: axum::Router) -> axum::Router {
    use axum::http::{header, HeaderName, HeaderValue, Method};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ));

    app.layer(cors).layer(security_headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert!(config.enabled);
        assert_eq!(config.issuer, "smartband-api");
        assert_eq!(config.session_ttl_minutes, 480);
        assert_eq!(config.login_path, "/login");
    }
}
