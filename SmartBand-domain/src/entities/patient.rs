use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Care status shown on the ward dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    /// Needs immediate attention
    Critical,
    /// Default on admission
    #[default]
    Stable,
    /// Improving, nearing discharge
    Recovering,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Critical => "critical",
            PatientStatus::Stable => "stable",
            PatientStatus::Recovering => "recovering",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(PatientStatus::Critical),
            "stable" => Ok(PatientStatus::Stable),
            "recovering" => Ok(PatientStatus::Recovering),
            other => Err(format!("Unknown patient status: {}", other)),
        }
    }
}

/// Domain model for an admitted patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Identifier assigned by the store
    pub patient_id: i64,

    /// Full name
    pub name: String,

    /// Age in years
    pub age: i64,

    /// Ward the patient is admitted to
    pub ward: String,

    /// Current care status
    pub status: PatientStatus,

    /// When the patient was admitted
    pub created_at: String,
}

/// Request payload for admitting a patient.
///
/// Fields are optional so a missing one can be reported as a validation
/// error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreatePatientRequest {
    #[validate(length(max = 100, message = "Name cannot exceed 100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i64>,

    #[validate(length(max = 50, message = "Ward cannot exceed 50 characters"))]
    pub ward: Option<String>,

    pub status: Option<PatientStatus>,
}

/// Request payload for a partial patient update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePatientRequest {
    #[validate(length(max = 100, message = "Name cannot exceed 100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i64>,

    #[validate(length(max = 50, message = "Ward cannot exceed 50 characters"))]
    pub ward: Option<String>,

    pub status: Option<PatientStatus>,
}

impl UpdatePatientRequest {
    /// True when the request would not change anything
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.ward.is_none() && self.status.is_none()
    }
}
