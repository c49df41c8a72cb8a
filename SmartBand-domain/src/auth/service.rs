use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use validator::Validate;

use smart_band_data::models::user::NewUser;
use smart_band_data::repository::{RepositoryError, UserRepositoryTrait};

use crate::auth::logging::{log_failed_login, log_registration, log_successful_login};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{generate_session_token, SecurityError};
use crate::auth::{AuthConfig, SessionUser};
use crate::entities::conversions;
use crate::entities::user::{LoginRequest, SignupRequest, User};
use crate::services::errors::{validation_message, ServiceError};

/// Message for every failed login, whatever the cause
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Session token to hand back as a cookie or bearer token
    pub token: String,
    /// The user it identifies
    pub user: SessionUser,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Trait for account operations
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Create an account
    async fn signup(&self, request: SignupRequest) -> Result<User, ServiceError>;

    /// Check credentials and issue a session token
    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ServiceError>;

    /// Settings the service issues tokens with
    fn config(&self) -> &AuthConfig;
}

/// Account service backed by a user repository
pub struct AuthService<U: UserRepositoryTrait> {
    users: U,
    config: Arc<AuthConfig>,
}

impl<U: UserRepositoryTrait> AuthService<U> {
    /// Create a new auth service
    pub fn new(users: U, config: Arc<AuthConfig>) -> Self {
        Self { users, config }
    }
}

impl From<SecurityError> for ServiceError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::ConfigError(msg) => ServiceError::Configuration(msg),
            other => ServiceError::Unhandled(other.to_string()),
        }
    }
}

#[async_trait]
impl<U: UserRepositoryTrait> AuthServiceTrait for AuthService<U> {
    async fn signup(&self, request: SignupRequest) -> Result<User, ServiceError> {
        let request = SignupRequest {
            username: request.username.trim().to_string(),
            ..request
        };
        if let Err(e) = request.validate() {
            let message = validation_message(&e);
            log_registration(&request.username, false, Some(&message));
            return Err(ServiceError::Validation(message));
        }

        let password_hash = hash_password(&request.password)?;
        let created = self.users
            .create(NewUser {
                username: request.username.clone(),
                password_hash,
                email: request.email.clone(),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    log_registration(&request.username, false, Some("username taken"));
                    ServiceError::Conflict("Username already exists".to_string())
                }
                other => ServiceError::from(other),
            })?;

        log_registration(&created.username, true, None);
        info!("Created user {}", created.id);

        Ok(conversions::convert_to_domain_user(created))
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ServiceError> {
        let username = request.username.trim();
        let unauthorized = || ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string());

        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                log_failed_login(username, "unknown user");
                return Err(unauthorized());
            }
        };

        let valid = verify_password(&request.password, &user.password_hash).unwrap_or_else(|e| {
            error!("Stored hash for user {} is unusable: {}", user.id, e);
            false
        });
        if !valid {
            log_failed_login(username, "wrong password");
            return Err(unauthorized());
        }

        let session_user = SessionUser {
            user_id: user.id,
            username: user.username,
        };
        let token = generate_session_token(&self.config, &session_user)?;
        log_successful_login(&session_user.username);

        Ok(LoginOutcome {
            token,
            user: session_user,
            expires_in: self.config.session_ttl_minutes * 60,
        })
    }

    fn config(&self) -> &AuthConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::validate_token;
    use smart_band_data::database::DatabasePool;
    use smart_band_data::repository::{InMemoryStorage, UserRepository};

    fn service() -> AuthService<UserRepository> {
        let config = AuthConfig {
            jwt_secret: "service-test-secret".to_string(),
            ..AuthConfig::default()
        };
        AuthService::new(
            UserRepository::new(DatabasePool::Memory(InMemoryStorage::new())),
            Arc::new(config),
        )
    }

    fn signup(username: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            password: "correct horse battery".to_string(),
            email: Some("ward@example.org".to_string()),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let service = service();
        let user = service.signup(signup(" matron ")).await.unwrap();
        assert_eq!(user.username, "matron");

        let outcome = service.login(LoginRequest {
            username: "matron".to_string(),
            password: "correct horse battery".to_string(),
        }).await.unwrap();

        assert_eq!(outcome.user.user_id, user.id);
        assert_eq!(outcome.expires_in, 480 * 60);
        let claims = validate_token(service.config(), &outcome.token).unwrap();
        assert_eq!(claims.username, "matron");
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let service = service();
        service.signup(signup("porter")).await.unwrap();

        let err = service.signup(signup("porter")).await.unwrap_err();
        assert_eq!(err, ServiceError::Conflict("Username already exists".to_string()));
    }

    #[test]
    fn test_signup_validation() {
        let service = service();

        let short = SignupRequest { password: "short".to_string(), ..signup("registrar") };
        let err = tokio_test::block_on(service.signup(short)).unwrap_err();
        assert_eq!(err, ServiceError::Validation("password: Password must be at least 8 characters".to_string()));

        let bad_email = SignupRequest { email: Some("not-an-email".to_string()), ..signup("registrar") };
        assert!(matches!(tokio_test::block_on(service.signup(bad_email)), Err(ServiceError::Validation(_))));

        let tiny = signup("ab");
        assert!(matches!(tokio_test::block_on(service.signup(tiny)), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let service = service();
        service.signup(signup("houseofficer")).await.unwrap();

        let wrong_password = service.login(LoginRequest {
            username: "houseofficer".to_string(),
            password: "incorrect".to_string(),
        }).await.unwrap_err();
        let unknown_user = service.login(LoginRequest {
            username: "ghost".to_string(),
            password: "whatever".to_string(),
        }).await.unwrap_err();

        assert_eq!(wrong_password, ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        assert_eq!(wrong_password, unknown_user);
    }
}
