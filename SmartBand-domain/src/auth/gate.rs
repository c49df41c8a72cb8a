//! Session gate for protected routes.
//!
//! Looks for a session token in the `Authorization: Bearer` header or the
//! `session` cookie. A request without a valid token never reaches the
//! handler: browsers are redirected to the login page, everything else gets
//! a JSON 401.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
use crate::auth::token;
use crate::auth::{AuthConfig, SESSION_COOKIE};

/// Body of the 401 sent to API callers
pub const AUTH_REQUIRED: &str = "Authentication required";

/// The response shape a caller expects when it is turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerKind {
    /// A page navigation that should be redirected to the login page
    Browser,
    /// A script or service that expects a status code
    Api,
}

impl CallerKind {
    /// Browsers ask for HTML and are not XHR requests
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_html = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.to_ascii_lowercase().contains("text/html"));

        let is_xhr = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false);

        if wants_html && !is_xhr {
            CallerKind::Browser
        } else {
            CallerKind::Api
        }
    }
}

/// Extract the session token and how it was sent
pub fn session_marker(headers: &HeaderMap) -> Option<(String, &'static str)> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some((token.to_string(), "bearer"));
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| (value.to_string(), "cookie"))
}

/// Middleware requiring a valid session on the wrapped routes.
///
/// On success the caller's [`SessionUser`](crate::auth::SessionUser) is
/// available to handlers as an `Extension`.
pub async fn require_session(
    State(config): State<Arc<AuthConfig>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if !config.enabled {
        return next.run(req).await;
    }

    let start_time = Instant::now();
    let resource = req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let outcome = match session_marker(req.headers()) {
        Some((marker, method)) => token::validate_token(&config, &marker)
            .and_then(|claims| token::session_user(&claims))
            .map_err(|e| (e.to_string(), method)),
        None => Err(("Missing session token".to_string(), "none")),
    };
    let duration = start_time.elapsed().as_millis() as u64;

    match outcome {
        Ok(user) => {
            debug!("Session valid for {} on {}", user.username, resource);
            log_auth_event(
                AuthEvent::new(AuthEventType::SessionValidation, Some(&user.username), true)
                    .with_resource(resource)
                    .with_duration(duration),
            );
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err((reason, method)) => {
            log_auth_event(
                AuthEvent::new(AuthEventType::AccessDenied, None, false)
                    .with_details(reason)
                    .with_resource(resource.clone())
                    .with_duration(duration)
                    .with_auth_method(method),
            );
            reject(&config, CallerKind::from_headers(req.headers()), &resource)
        }
    }
}

fn reject(config: &AuthConfig, caller: CallerKind, resource: &str) -> Response {
    match caller {
        CallerKind::Browser => {
            let location = format!("{}?next={}", config.login_path, urlencoding::encode(resource));
            Redirect::to(&location).into_response()
        }
        CallerKind::Api => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": AUTH_REQUIRED })),
        ).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::generate_session_token;
    use crate::auth::SessionUser;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn config() -> Arc<AuthConfig> {
        Arc::new(AuthConfig {
            jwt_secret: "gate-test-secret".to_string(),
            ..AuthConfig::default()
        })
    }

    fn app(config: Arc<AuthConfig>) -> Router {
        async fn whoami(user: Option<Extension<SessionUser>>) -> String {
            user.map(|Extension(u)| u.username).unwrap_or_else(|| "nobody".to_string())
        }

        Router::new()
            .route("/patients", get(whoami))
            .layer(middleware::from_fn_with_state(config, require_session))
    }

    fn token(config: &AuthConfig) -> String {
        generate_session_token(config, &SessionUser { user_id: 1, username: "sister".to_string() }).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_caller_kind() {
        let mut headers = HeaderMap::new();
        assert_eq!(CallerKind::from_headers(&headers), CallerKind::Api);

        headers.insert(header::ACCEPT, "text/html,application/xhtml+xml".parse().unwrap());
        assert_eq!(CallerKind::from_headers(&headers), CallerKind::Browser);

        headers.insert("x-requested-with", "XMLHttpRequest".parse().unwrap());
        assert_eq!(CallerKind::from_headers(&headers), CallerKind::Api);
    }

    #[test]
    fn test_session_marker_sources() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; session=abc.def.ghi".parse().unwrap());
        assert_eq!(session_marker(&headers), Some(("abc.def.ghi".to_string(), "cookie")));

        headers.insert(header::AUTHORIZATION, "Bearer xyz".parse().unwrap());
        assert_eq!(session_marker(&headers), Some(("xyz".to_string(), "bearer")));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, "session=".parse().unwrap());
        assert_eq!(session_marker(&empty), None);
    }

    #[tokio::test]
    async fn test_api_caller_without_session_gets_401() {
        let response = app(config())
            .oneshot(Request::builder().uri("/patients").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_string(response).await, r#"{"error":"Authentication required"}"#);
    }

    #[tokio::test]
    async fn test_browser_without_session_is_redirected() {
        let response = app(config())
            .oneshot(
                Request::builder()
                    .uri("/patients?ward=ICU")
                    .header(header::ACCEPT, "text/html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?next=%2Fpatients%3Fward%3DICU"
        );
    }

    #[tokio::test]
    async fn test_valid_cookie_reaches_handler() {
        let config = config();
        let cookie = format!("{}={}", SESSION_COOKIE, token(&config));

        let response = app(config)
            .oneshot(
                Request::builder()
                    .uri("/patients")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "sister");
    }

    #[tokio::test]
    async fn test_tampered_bearer_is_rejected() {
        let config = config();
        let tampered = format!("{}x", token(&config));

        let response = app(config)
            .oneshot(
                Request::builder()
                    .uri("/patients")
                    .header(header::AUTHORIZATION, format!("Bearer {}", tampered))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_disabled_gate_lets_everything_through() {
        let config = Arc::new(AuthConfig { enabled: false, ..AuthConfig::default() });

        let response = app(config)
            .oneshot(Request::builder().uri("/patients").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "nobody");
    }
}
