use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use tracing::{info, instrument};

use crate::api::errors::ApiError;
use crate::api::extract::ApiPath;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// PNG QR code linking to the patient's page
#[utoipa::path(
    get,
    path = "/generate_qr/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "QR code image", content_type = "image/png", body = Vec<u8>),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn generate_qr(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<impl IntoResponse, ApiError> {
    let png = state.qr.generate_patient_qr(id).await?;
    info!("Generated QR code for patient {} ({} bytes)", id, png.len());

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename=\"patient_{}.png\"", id)),
        ],
        png,
    ))
}
