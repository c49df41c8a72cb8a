use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::state::AppState;
use crate::entities::common::{ErrorResponse, MessageResponse};
use crate::entities::patient::{CreatePatientRequest, Patient, UpdatePatientRequest};

/// List every admitted patient
#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patients ordered by id", body = [Patient]),
        (status = 401, description = "No valid session", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = state.patients.list_patients().await?;
    Ok(Json(patients.into_iter().map(Patient::from).collect()))
}

/// Fetch one patient
#[utoipa::path(
    get,
    path = "/patient/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient", body = Patient),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn get_patient(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<Patient>, ApiError> {
    let patient = state.patients.get_patient(id).await?;
    Ok(Json(patient.into()))
}

/// Admit a patient
#[utoipa::path(
    post,
    path = "/add_patient",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient admitted", body = Patient),
        (status = 400, description = "Missing or invalid name, age or ward", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[instrument(skip(state, request))]
pub async fn add_patient(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = state.patients.create_patient(request.into()).await?;
    Ok((StatusCode::CREATED, Json(patient.into())))
}

/// Change any of a patient's name, age, ward or status
#[utoipa::path(
    put,
    path = "/edit_patient/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Updated patient", body = Patient),
        (status = 400, description = "Empty or invalid update", body = ErrorResponse),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[instrument(skip(state, request))]
pub async fn edit_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdatePatientRequest>,
) -> Result<Json<Patient>, ApiError> {
    let patient = state.patients.update_patient(id, request.into()).await?;
    Ok(Json(patient.into()))
}

/// Discharge a patient, removing their vitals history with them
#[utoipa::path(
    delete,
    path = "/delete_patient/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient discharged", body = MessageResponse),
        (status = 404, description = "No such patient", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.patients.discharge_patient(id).await?;
    Ok(Json(MessageResponse::new(format!("Patient {} discharged", id))))
}
