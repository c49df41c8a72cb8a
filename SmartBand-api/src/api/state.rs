use std::sync::Arc;

use smart_band_data::database::DatabasePool;
use smart_band_data::repository::{PatientRepository, UserRepository, VitalsRepository};
use smart_band_domain::auth::{AuthConfig, AuthService, AuthServiceTrait};
use smart_band_domain::health::{HealthService, HealthServiceTrait};
use smart_band_domain::services::{
    PatientService, PatientServiceTrait, QrService, QrServiceTrait, VitalsService, VitalsServiceTrait,
};

use crate::config::AppConfig;

/// Service type for dependency injection
pub type SharedPatientService = Arc<dyn PatientServiceTrait>;
pub type SharedVitalsService = Arc<dyn VitalsServiceTrait>;
pub type SharedQrService = Arc<dyn QrServiceTrait>;
pub type SharedAuthService = Arc<dyn AuthServiceTrait>;
pub type SharedHealthService = Arc<dyn HealthServiceTrait>;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub patients: SharedPatientService,
    pub vitals: SharedVitalsService,
    pub qr: SharedQrService,
    pub auth: SharedAuthService,
    pub health: SharedHealthService,
    pub auth_config: Arc<AuthConfig>,
    /// Deployment name reported by `/health`
    pub environment: String,
}

impl AppState {
    /// Wire every service to the same pool
    pub fn new(pool: DatabasePool, auth_config: Arc<AuthConfig>, qr_base_url: impl Into<String>) -> Self {
        Self {
            patients: Arc::new(PatientService::new(PatientRepository::new(pool.clone()))),
            vitals: Arc::new(VitalsService::new(
                PatientRepository::new(pool.clone()),
                VitalsRepository::new(pool.clone()),
            )),
            qr: Arc::new(QrService::new(PatientRepository::new(pool.clone()), qr_base_url)),
            auth: Arc::new(AuthService::new(UserRepository::new(pool.clone()), auth_config.clone())),
            health: Arc::new(HealthService::new(pool)),
            auth_config,
            environment: "development".to_string(),
        }
    }

    /// Build the state described by a loaded configuration
    pub fn from_config(pool: DatabasePool, config: &AppConfig) -> Self {
        let mut state = Self::new(pool, config.auth.clone().shared(), config.qr_base_url.clone());
        state.environment = config.environment.clone();
        state
    }
}
