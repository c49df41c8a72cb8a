use serde::{Deserialize, Serialize};

/// Storage model for a patient row
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

    /// Care status (critical, stable, recovering)
    pub status: String,

    /// When the patient was admitted, set by the store
    pub created_at: String,
}

/// Input data for inserting a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub ward: String,
    pub status: String,
}

/// Partial update of a patient; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub ward: Option<String>,
    pub status: Option<String>,
}

impl PatientChanges {
    /// True when no column would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.ward.is_none() && self.status.is_none()
    }

    /// Apply the changes to an existing row
    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(name) = &self.name {
            patient.name = name.clone();
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(ward) = &self.ward {
            patient.ward = ward.clone();
        }
        if let Some(status) = &self.status {
            patient.status = status.clone();
        }
    }
}
