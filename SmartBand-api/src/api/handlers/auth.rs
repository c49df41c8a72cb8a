use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::instrument;

use smart_band_domain::auth::logging::log_logout;
use smart_band_domain::auth::token::validate_token;
use smart_band_domain::auth::{session_marker, SESSION_COOKIE};

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::AppState;
use crate::entities::auth::{
    LoginPageQuery, LoginPageResponse, LoginRequest, LoginResponse, SignupRequest, UserResponse,
};
use crate::entities::common::{ErrorResponse, MessageResponse};

fn session_cookie(token: &str, max_age: i64) -> String {
    format!("{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}", SESSION_COOKIE, token, max_age)
}

/// Create an account
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid username, password or email", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.auth.signup(request.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Where browsers land when the session gate turns them away
#[utoipa::path(
    get,
    path = "/login",
    params(LoginPageQuery),
    responses(
        (status = 200, description = "How to log in", body = LoginPageResponse)
    ),
    tag = "auth"
)]
pub async fn login_page(ApiQuery(query): ApiQuery<LoginPageQuery>) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        message: "Log in by sending a JSON body with username and password to POST /login".to_string(),
        next: query.next,
    })
}

/// Check credentials and start a session
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; the token is also set as the session cookie", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.login(request.into()).await?;
    let cookie = session_cookie(&outcome.token, outcome.expires_in);

    let body = LoginResponse {
        token: outcome.token,
        token_type: "Bearer".to_string(),
        expires_in: outcome.expires_in,
        user: outcome.user,
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)))
}

/// End the session by clearing the cookie
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let username = session_marker(&headers)
        .and_then(|(token, _)| validate_token(&state.auth_config, &token).ok())
        .map(|claims| claims.username);
    log_logout(username.as_deref());

    (
        [(header::SET_COOKIE, session_cookie("", 0))],
        Json(MessageResponse::new("Logged out")),
    )
}
