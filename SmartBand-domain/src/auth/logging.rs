use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// User login
    Login,
    /// Failed login attempt
    FailedLogin,
    /// User logout
    Logout,
    /// Account creation
    Registration,
    /// Session token checked by the gate
    SessionValidation,
    /// Request turned away by the gate
    AccessDenied,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::Logout => write!(f, "LOGOUT"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::SessionValidation => write!(f, "SESSION_VALIDATION"),
            AuthEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    /// Type of authentication event
    pub event_type: AuthEventType,
    /// Username or user id (if known)
    pub user: Option<String>,
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    /// Whether the event was successful
    pub success: bool,
    /// Additional details about the event
    pub details: Option<String>,
    /// The resource being accessed (if applicable)
    pub resource: Option<String>,
    /// Duration of the operation in milliseconds (if applicable)
    pub duration_ms: Option<u64>,
    /// Authentication method used (password, cookie, bearer)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, user: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user: user.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    /// Set the details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Set the resource
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Set the authentication method
    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event
pub fn log_auth_event(event: AuthEvent) {
    let user = event.user.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");
    let method = event.auth_method.as_deref().unwrap_or("-");

    if event.success {
        info!(
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type, user, status, method, resource, event.timestamp.to_rfc3339(), details
        );
    } else {
        warn!(
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type, user, status, method, resource, event.timestamp.to_rfc3339(), details
        );
    }
}

/// Log a successful login
pub fn log_successful_login(username: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Login, Some(username), true).with_auth_method("password"));
}

/// Log a failed login attempt
pub fn log_failed_login(username: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(username), false)
        .with_details(reason)
        .with_auth_method("password");
    log_auth_event(event);
}

/// Log an account creation attempt
pub fn log_registration(username: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::Registration, Some(username), success);
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

/// Log a logout event
pub fn log_logout(username: Option<&str>) {
    log_auth_event(AuthEvent::new(AuthEventType::Logout, username, true));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_auth_event() {
        let event = AuthEvent::new(AuthEventType::AccessDenied, None, false)
            .with_details("Missing session")
            .with_resource("/patients")
            .with_duration(3)
            .with_auth_method("cookie");

        assert_eq!(event.event_type, AuthEventType::AccessDenied);
        assert_eq!(event.user, None);
        assert!(!event.success);
        assert_eq!(event.details.as_deref(), Some("Missing session"));
        assert_eq!(event.resource.as_deref(), Some("/patients"));
        assert_eq!(event.duration_ms, Some(3));
        assert_eq!(event.auth_method.as_deref(), Some("cookie"));
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(AuthEventType::Login.to_string(), "LOGIN");
        assert_eq!(AuthEventType::FailedLogin.to_string(), "FAILED_LOGIN");
        assert_eq!(AuthEventType::SessionValidation.to_string(), "SESSION_VALIDATION");
    }
}
