use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::{debug, instrument};

use smart_band_domain::services::vitals::{coerce_patient_id, DEFAULT_RECENT_LIMIT};

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::vitals::{AddVitalsRequest, RecentVitalsQuery, VitalsRecord, VitalsUpdateRequest};

/// Latest vitals reading of a patient
#[utoipa::path(
    get,
    path = "/get_vitals/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Most recent reading", body = VitalsRecord),
        (status = 404, description = "No readings recorded", body = ErrorResponse)
    ),
    tag = "vitals"
)]
#[instrument(skip(state))]
pub async fn get_vitals(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<VitalsRecord>, ApiError> {
    let record = state.vitals.latest_vitals(id).await?;
    Ok(Json(record.into()))
}

/// Every reading of a patient, oldest first
#[utoipa::path(
    get,
    path = "/vitals_history/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Readings in ascending time order", body = [VitalsRecord]),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "vitals"
)]
#[instrument(skip(state))]
pub async fn vitals_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<VitalsRecord>>, ApiError> {
    let history = state.vitals.vitals_history(id).await?;
    debug!("Returning {} readings for patient {}", history.len(), id);
    Ok(Json(history.into_iter().map(VitalsRecord::from).collect()))
}

/// Append a reading merged over the patient's latest one
#[utoipa::path(
    put,
    path = "/edit_vitals/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = VitalsUpdateRequest,
    responses(
        (status = 201, description = "Merged reading appended", body = VitalsRecord),
        (status = 400, description = "No vital sign supplied or a value is not numeric", body = ErrorResponse),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "vitals"
)]
#[instrument(skip(state, request))]
pub async fn edit_vitals(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<VitalsUpdateRequest>,
) -> Result<(StatusCode, Json<VitalsRecord>), ApiError> {
    let record = state.vitals.record_vitals(id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Sensor gateway ingestion; the patient id travels in the body
#[utoipa::path(
    post,
    path = "/add_vitals",
    request_body = AddVitalsRequest,
    responses(
        (status = 201, description = "Merged reading appended", body = VitalsRecord),
        (status = 400, description = "Missing patient_id or invalid vitals", body = ErrorResponse),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "vitals"
)]
#[instrument(skip(state, request))]
pub async fn add_vitals(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddVitalsRequest>,
) -> Result<(StatusCode, Json<VitalsRecord>), ApiError> {
    let (patient_id, update) = request.into_parts();
    let patient_id = coerce_patient_id(patient_id.as_ref())?;
    let record = state.vitals.record_vitals(patient_id, update).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Most recent readings of a patient, newest first
#[utoipa::path(
    get,
    path = "/patient/{id}/vitals",
    params(
        ("id" = i64, Path, description = "Patient id"),
        RecentVitalsQuery
    ),
    responses(
        (status = 200, description = "Up to `limit` readings, newest first", body = [VitalsRecord]),
        (status = 400, description = "Limit is zero or not a number", body = ErrorResponse),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "vitals"
)]
#[instrument(skip(state))]
pub async fn recent_vitals(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<RecentVitalsQuery>,
) -> Result<Json<Vec<VitalsRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let records = state.vitals.recent_vitals(id, limit).await?;
    Ok(Json(records.into_iter().map(VitalsRecord::from).collect()))
}
