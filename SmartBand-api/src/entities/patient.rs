use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use smart_band_domain::entities::patient::{
    CreatePatientRequest as DomainCreatePatientRequest, Patient as DomainPatient, PatientStatus,
    UpdatePatientRequest as DomainUpdatePatientRequest,
};

/// An admitted patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    #[schema(example = 7)]
    pub patient_id: i64,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = 36)]
    pub age: i64,
    #[schema(example = "Cardiology")]
    pub ward: String,
    pub status: PatientStatus,
    /// When the patient was admitted (RFC 3339)
    pub created_at: String,
}

impl From<DomainPatient> for Patient {
    fn from(patient: DomainPatient) -> Self {
        Self {
            patient_id: patient.patient_id,
            name: patient.name,
            age: patient.age,
            ward: patient.ward,
            status: patient.status,
            created_at: patient.created_at,
        }
    }
}

/// Body of `POST /add_patient`. Name, age and ward are required; status
/// defaults to `stable`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = 36, minimum = 0, maximum = 150)]
    pub age: Option<i64>,
    #[schema(example = "Cardiology")]
    pub ward: Option<String>,
    pub status: Option<PatientStatus>,
}

impl From<CreatePatientRequest> for DomainCreatePatientRequest {
    fn from(request: CreatePatientRequest) -> Self {
        Self {
            name: request.name,
            age: request.age,
            ward: request.ward,
            status: request.status,
        }
    }
}

/// Body of `PUT /edit_patient/{id}`; any subset of fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    #[schema(minimum = 0, maximum = 150)]
    pub age: Option<i64>,
    pub ward: Option<String>,
    pub status: Option<PatientStatus>,
}

impl From<UpdatePatientRequest> for DomainUpdatePatientRequest {
    fn from(request: UpdatePatientRequest) -> Self {
        Self {
            name: request.name,
            age: request.age,
            ward: request.ward,
            status: request.status,
        }
    }
}
