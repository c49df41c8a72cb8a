use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use smart_band_domain::auth::{configure_auth, require_session};

use crate::api::handlers::{auth, health, patients, qr, vitals};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Ward routes; every one of them sits behind the session gate
    let gated_routes = Router::new()
        .route("/patients", get(patients::list_patients))
        .route("/patient/:id", get(patients::get_patient))
        .route("/patient/:id/vitals", get(vitals::recent_vitals))
        .route("/add_patient", post(patients::add_patient))
        .route("/edit_patient/:id", put(patients::edit_patient))
        .route("/delete_patient/:id", delete(patients::delete_patient))
        .route("/get_vitals/:id", get(vitals::get_vitals))
        .route("/vitals_history/:id", get(vitals::vitals_history))
        .route("/edit_vitals/:id", put(vitals::edit_vitals))
        .route("/add_vitals", post(vitals::add_vitals))
        .route("/generate_qr/:id", get(qr::generate_qr))
        .route_layer(middleware::from_fn_with_state(
            state.auth_config.clone(),
            require_session,
        ));

    debug!("Gated routes configured");

    let public_routes = Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/signup", post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(public_routes)
        .merge(gated_routes)
        .with_state(state);

    let app = add_swagger_ui(app).layer(TraceLayer::new_for_http());

    debug!("Swagger UI and tracing merged");

    // Apply CORS and security headers
    configure_auth(app)
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
