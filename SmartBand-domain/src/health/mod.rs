//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use smart_band_data::database::DatabasePool;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Derive the overall status from the worst component
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database.
    /// Returns an error if the check could not be performed.
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service that pings the injected pool
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: DatabasePool,
}

impl HealthService {
    /// Create a new health service
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        let database = match self.check_database_status().await {
            Ok(_) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(self.pool.connection_info()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };
        components.insert("database".to_string(), database);

        // Always healthy while this code runs
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        self.pool.ping().await.map(|_| true).map_err(|e| {
            warn!("Database health check failed: {}", e);
            format!("Database connection error: {}", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_band_data::repository::InMemoryStorage;

    #[tokio::test]
    async fn test_sqlite_pool_is_healthy() {
        let service = HealthService::new(DatabasePool::sqlite_in_memory().unwrap());
        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("database"));
        assert!(health.components.contains_key("api"));
    }

    #[tokio::test]
    async fn test_memory_pool_is_healthy() {
        let service = HealthService::new(DatabasePool::Memory(InMemoryStorage::new()));
        assert_eq!(service.check_database_status().await, Ok(true));
    }

    #[test]
    fn test_worst_component_wins() {
        let mut components = HashMap::new();
        components.insert("api".to_string(), HealthComponent { status: ComponentStatus::Healthy, details: None });
        components.insert("cache".to_string(), HealthComponent { status: ComponentStatus::Degraded, details: None });
        assert_eq!(SystemHealth::from_components(components.clone()).status, SystemStatus::Degraded);

        components.insert("database".to_string(), HealthComponent { status: ComponentStatus::Unhealthy, details: None });
        assert_eq!(SystemHealth::from_components(components).status, SystemStatus::Unhealthy);
    }
}
