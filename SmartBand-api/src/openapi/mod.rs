use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::index,
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::signup,
        crate::api::handlers::auth::login_page,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,

        // Patient endpoints
        crate::api::handlers::patients::list_patients,
        crate::api::handlers::patients::get_patient,
        crate::api::handlers::patients::add_patient,
        crate::api::handlers::patients::edit_patient,
        crate::api::handlers::patients::delete_patient,
        crate::api::handlers::qr::generate_qr,

        // Vitals endpoints
        crate::api::handlers::vitals::get_vitals,
        crate::api::handlers::vitals::vitals_history,
        crate::api::handlers::vitals::edit_vitals,
        crate::api::handlers::vitals::add_vitals,
        crate::api::handlers::vitals::recent_vitals
    ),
    components(
        schemas(
            // Entities
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::patient::Patient,
            crate::entities::patient::CreatePatientRequest,
            crate::entities::patient::UpdatePatientRequest,
            crate::entities::vitals::VitalsRecord,
            crate::entities::vitals::VitalsUpdateRequest,
            crate::entities::vitals::AddVitalsRequest,
            crate::entities::vitals::RecentVitalsQuery,
            crate::entities::auth::SignupRequest,
            crate::entities::auth::LoginRequest,
            crate::entities::auth::UserResponse,
            crate::entities::auth::LoginResponse,
            crate::entities::auth::LoginPageResponse,

            // Domain schemas
            smart_band_domain::entities::patient::PatientStatus,
            smart_band_domain::auth::SessionUser,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Liveness and health check endpoints"),
        (name = "auth", description = "Account and session endpoints"),
        (name = "patients", description = "Patient admission, updates, discharge and QR codes"),
        (name = "vitals", description = "Append-only vitals history")
    ),
    info(
        title = "SmartBand API",
        version = "0.1.0",
        description = "Hospital patient monitoring backend for SmartBand wearables",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "SmartBand API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "patients"));
        assert!(tags.iter().any(|tag| tag.name == "vitals"));

        for path in [
            "/health",
            "/patients",
            "/patient/{id}",
            "/patient/{id}/vitals",
            "/add_patient",
            "/edit_vitals/{id}",
            "/add_vitals",
            "/generate_qr/{id}",
            "/login",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }
}
