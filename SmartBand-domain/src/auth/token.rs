use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::auth::{AuthConfig, Claims, SessionUser};

/// Security errors for authentication and token operations
#[derive(Debug, Error, PartialEq)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("Security error: {0}")]
    Generic(String),
}

/// Issue a session token for a user
pub fn generate_session_token(config: &AuthConfig, user: &SessionUser) -> Result<String, SecurityError> {
    if config.jwt_secret.is_empty() {
        error!("Cannot issue session token without JWT_SECRET");
        return Err(SecurityError::ConfigError("JWT_SECRET is not configured".to_string()));
    }

    let now = Utc::now();
    let expiration = now + Duration::minutes(config.session_ttl_minutes);

    let claims = Claims {
        sub: user.user_id.to_string(),
        username: user.username.clone(),
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    ).map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Log token generation (but not the token itself)
    debug!("Issued session token {} for user {}, expires {}", claims.jti, user.username, expiration);

    Ok(token)
}

/// Validate a session token and return the decoded claims
pub fn validate_token(config: &AuthConfig, token: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_issuer(&[config.issuer.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            SecurityError::TokenValidation("Invalid signature".to_string())
        }
        _ => SecurityError::TokenValidation(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Turn validated claims back into the caller they describe
pub fn session_user(claims: &Claims) -> Result<SessionUser, SecurityError> {
    let user_id = claims.sub.parse::<i64>()
        .map_err(|_| SecurityError::TokenValidation(format!("Subject is not a user id: {}", claims.sub)))?;

    Ok(SessionUser {
        user_id,
        username: claims.username.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test_secret_key_for_testing_only".to_string(),
            issuer: "test-issuer".to_string(),
            ..AuthConfig::default()
        }
    }

    fn nurse() -> SessionUser {
        SessionUser { user_id: 42, username: "nurse".to_string() }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = test_config();
        let token = generate_session_token(&config, &nurse()).unwrap();

        let claims = validate_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "nurse");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp - claims.iat, 480 * 60);
        assert_eq!(session_user(&claims).unwrap(), nurse());
    }

    #[test]
    fn test_tokens_have_unique_ids() {
        let config = test_config();
        let first = validate_token(&config, &generate_session_token(&config, &nurse()).unwrap()).unwrap();
        let second = validate_token(&config, &generate_session_token(&config, &nurse()).unwrap()).unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_token_expiration() {
        let config = test_config();
        let claims = Claims {
            sub: "42".to_string(),
            username: "nurse".to_string(),
            iss: config.issuer.clone(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
            jti: "expired".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        ).unwrap();

        assert_eq!(validate_token(&config, &token), Err(SecurityError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_or_issuer_is_rejected() {
        let config = test_config();
        let token = generate_session_token(&config, &nurse()).unwrap();

        let other_secret = AuthConfig { jwt_secret: "another_secret".to_string(), ..test_config() };
        assert!(validate_token(&other_secret, &token).is_err());

        let other_issuer = AuthConfig { issuer: "someone-else".to_string(), ..test_config() };
        assert_eq!(validate_token(&other_issuer, &token), Err(SecurityError::InvalidIssuer));
    }

    #[test]
    fn test_invalid_token() {
        let result = validate_token(&test_config(), "invalid.token.format");
        assert!(matches!(result, Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_))));
    }

    #[test]
    fn test_missing_secret_cannot_issue() {
        let config = AuthConfig::default();
        assert!(matches!(generate_session_token(&config, &nurse()), Err(SecurityError::ConfigError(_))));
    }
}
