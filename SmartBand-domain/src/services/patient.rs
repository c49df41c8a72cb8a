use async_trait::async_trait;
use tracing::{info, warn};
use validator::Validate;

use smart_band_data::repository::PatientRepositoryTrait;

use crate::entities::conversions;
use crate::entities::patient::{CreatePatientRequest, Patient, UpdatePatientRequest};
use crate::services::errors::{validation_message, ServiceError};

/// Message returned when a create request lacks a required field
pub const MISSING_PATIENT_FIELDS: &str = "Missing name, age, or ward";

/// Trait for patient service operations
#[async_trait]
pub trait PatientServiceTrait: Send + Sync {
    /// All patients ordered by id
    async fn list_patients(&self) -> Result<Vec<Patient>, ServiceError>;

    /// Get one patient
    async fn get_patient(&self, patient_id: i64) -> Result<Patient, ServiceError>;

    /// Admit a patient
    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, ServiceError>;

    /// Change some of a patient's details
    async fn update_patient(&self, patient_id: i64, request: UpdatePatientRequest) -> Result<Patient, ServiceError>;

    /// Discharge (delete) a patient
    async fn discharge_patient(&self, patient_id: i64) -> Result<(), ServiceError>;
}

/// Patient service for domain logic
pub struct PatientService<R: PatientRepositoryTrait> {
    repository: R,
}

impl<R: PatientRepositoryTrait> PatientService<R> {
    /// Create a new patient service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

fn not_found(patient_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Patient {} not found", patient_id))
}

fn reject_blank(field: &str, value: Option<&String>) -> Result<(), ServiceError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ServiceError::Validation(format!("{} cannot be blank", field))),
        _ => Ok(()),
    }
}

#[async_trait]
impl<R: PatientRepositoryTrait> PatientServiceTrait for PatientService<R> {
    async fn list_patients(&self) -> Result<Vec<Patient>, ServiceError> {
        let patients = self.repository.list().await?;
        Ok(patients.into_iter().map(conversions::convert_to_domain_patient).collect())
    }

    async fn get_patient(&self, patient_id: i64) -> Result<Patient, ServiceError> {
        self.repository.get(patient_id)
            .await?
            .map(conversions::convert_to_domain_patient)
            .ok_or_else(|| not_found(patient_id))
    }

    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, ServiceError> {
        let new_patient = conversions::convert_to_data_new_patient(&request).ok_or_else(|| {
            warn!("Rejected patient without name, age or ward");
            ServiceError::Validation(MISSING_PATIENT_FIELDS.to_string())
        })?;

        reject_blank("name", request.name.as_ref())?;
        reject_blank("ward", request.ward.as_ref())?;
        request.validate().map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        let created = self.repository.create(new_patient).await?;
        info!("Admitted patient {} to ward {}", created.patient_id, created.ward);

        Ok(conversions::convert_to_domain_patient(created))
    }

    async fn update_patient(&self, patient_id: i64, request: UpdatePatientRequest) -> Result<Patient, ServiceError> {
        if request.is_empty() {
            return Err(ServiceError::Validation(
                "At least one of name, age, ward or status is required".to_string(),
            ));
        }
        reject_blank("name", request.name.as_ref())?;
        reject_blank("ward", request.ward.as_ref())?;
        request.validate().map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        let changes = conversions::convert_to_data_patient_changes(&request);
        self.repository.update(patient_id, changes)
            .await?
            .map(conversions::convert_to_domain_patient)
            .ok_or_else(|| not_found(patient_id))
    }

    async fn discharge_patient(&self, patient_id: i64) -> Result<(), ServiceError> {
        if !self.repository.delete(patient_id).await? {
            return Err(not_found(patient_id));
        }
        info!("Discharged patient {}", patient_id);
        Ok(())
    }
}
