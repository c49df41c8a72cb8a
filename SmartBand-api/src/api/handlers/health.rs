use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use smart_band_domain::health::{ComponentStatus as DomainComponentStatus, SystemHealth, SystemStatus};

use crate::api::state::AppState;
use crate::entities::common::MessageResponse;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Application version from the Cargo manifest
    pub version: String,
    /// Unix timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: ComponentStatus,
    pub environment: String,
}

/// Status of individual system components
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub database: ComponentHealthStatus,
    pub api: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time used for uptime reporting
pub fn initialize_server_start_time() {
    let _ = SERVER_START_TIME.set(unix_now());
}

/// Liveness message
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "API is running", body = MessageResponse)
    ),
    tag = "health"
)]
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse::new("SmartBand API running"))
}

/// Health check endpoint reporting database and API status
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|&start| now.saturating_sub(start));
    let system_health = state.health.get_system_health().await;

    let status_code = match system_health.status {
        SystemStatus::Healthy => StatusCode::OK,
        SystemStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        SystemStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let response = HealthResponse {
        status: map_system_status(&system_health.status).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: component_statuses(&system_health),
        environment: state.environment.clone(),
    };

    (status_code, Json(response))
}

fn component_statuses(health: &SystemHealth) -> ComponentStatus {
    let named = |name: &str| {
        let component = health.components.get(name);
        ComponentHealthStatus {
            status: component
                .map(|c| map_component_status(&c.status))
                .unwrap_or("ok")
                .to_string(),
            message: component.and_then(|c| c.details.clone()),
        }
    };

    ComponentStatus {
        database: named("database"),
        api: named("api"),
    }
}

fn map_system_status(status: &SystemStatus) -> &'static str {
    match status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    }
}

fn map_component_status(status: &DomainComponentStatus) -> &'static str {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use smart_band_domain::health::HealthComponent;

    #[test]
    fn test_component_statuses_carry_details() {
        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent { status: DomainComponentStatus::Unhealthy, details: Some("Database connection failed".to_string()) },
        );
        components.insert(
            "api".to_string(),
            HealthComponent { status: DomainComponentStatus::Healthy, details: None },
        );

        let health = SystemHealth::from_components(components);
        let statuses = component_statuses(&health);
        assert_eq!(statuses.database.status, "error");
        assert_eq!(statuses.database.message.as_deref(), Some("Database connection failed"));
        assert_eq!(statuses.api.status, "ok");
        assert_eq!(map_system_status(&health.status), "error");
    }

    #[test]
    fn test_missing_components_default_to_ok() {
        let statuses = component_statuses(&SystemHealth::from_components(HashMap::new()));
        assert_eq!(statuses.database.status, "ok");
        assert_eq!(statuses.api.status, "ok");
    }

    #[test]
    fn test_start_time_is_recorded_once() {
        initialize_server_start_time();
        let first = SERVER_START_TIME.get().copied();
        initialize_server_start_time();
        assert!(first.is_some());
        assert_eq!(SERVER_START_TIME.get().copied(), first);
    }
}
