use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use smart_band_domain::auth::SessionUser;
use smart_band_domain::entities::user::{LoginRequest as DomainLoginRequest, SignupRequest as DomainSignupRequest, User};

/// Body of `POST /signup`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "nurse.joy", min_length = 3, max_length = 64)]
    pub username: String,
    #[schema(min_length = 8)]
    pub password: String,
    #[schema(example = "joy@ward.example")]
    pub email: Option<String>,
}

impl From<SignupRequest> for DomainSignupRequest {
    fn from(request: SignupRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            email: request.email,
        }
    }
}

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl From<LoginRequest> for DomainLoginRequest {
    fn from(request: LoginRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
        }
    }
}

/// A created account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Successful login. The same token is also set as the `session` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: SessionUser,
}

/// Query of `GET /login`, filled in by the session gate's redirect
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginPageQuery {
    /// Page the caller was sent away from
    pub next: Option<String>,
}

/// Body of `GET /login`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginPageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}
