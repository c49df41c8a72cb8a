/// Conversion functions between domain entities and data models.
/// These functions follow the pattern convert_to_[target_layer]_[model_name].
use tracing::warn;

use smart_band_data::models::patient as data_patient;
use smart_band_data::models::user as data_user;
use smart_band_data::models::vitals as data_vitals;

use crate::entities::patient::{CreatePatientRequest, Patient, PatientStatus, UpdatePatientRequest};
use crate::entities::user::User;
use crate::entities::vitals::{NewVitals, VitalsRecord};

/// Convert from data model to domain entity for a patient.
///
/// An unrecognised status string in the store falls back to `stable`.
pub fn convert_to_domain_patient(data_patient: data_patient::Patient) -> Patient {
    let status = data_patient.status.parse::<PatientStatus>().unwrap_or_else(|e| {
        warn!("Patient {} has {}, treating as stable", data_patient.patient_id, e);
        PatientStatus::Stable
    });

    Patient {
        patient_id: data_patient.patient_id,
        name: data_patient.name,
        age: data_patient.age,
        ward: data_patient.ward,
        status,
        created_at: data_patient.created_at,
    }
}

/// Convert a validated create request to the data model.
///
/// Returns `None` when a required field is missing.
pub fn convert_to_data_new_patient(request: &CreatePatientRequest) -> Option<data_patient::NewPatient> {
    Some(data_patient::NewPatient {
        name: request.name.as_deref()?.trim().to_string(),
        age: request.age?,
        ward: request.ward.as_deref()?.trim().to_string(),
        status: request.status.unwrap_or_default().as_str().to_string(),
    })
}

/// Convert an update request to the data model's column changes
pub fn convert_to_data_patient_changes(request: &UpdatePatientRequest) -> data_patient::PatientChanges {
    data_patient::PatientChanges {
        name: request.name.as_ref().map(|n| n.trim().to_string()),
        age: request.age,
        ward: request.ward.as_ref().map(|w| w.trim().to_string()),
        status: request.status.map(|s| s.as_str().to_string()),
    }
}

/// Convert from data model to domain entity for a vitals reading
pub fn convert_to_domain_vitals(data_record: data_vitals::VitalsRecord) -> VitalsRecord {
    VitalsRecord {
        id: data_record.id,
        patient_id: data_record.patient_id,
        timestamp: data_record.timestamp,
        heart_rate: data_record.heart_rate,
        spo2: data_record.spo2,
        temperature: data_record.temperature,
    }
}

/// Convert from domain entity to data model for a merged reading
pub fn convert_to_data_new_vitals(merged: &NewVitals) -> data_vitals::NewVitalsRecord {
    data_vitals::NewVitalsRecord {
        patient_id: merged.patient_id,
        heart_rate: merged.heart_rate,
        spo2: merged.spo2,
        temperature: merged.temperature,
    }
}

/// Convert from data model to domain entity for a user, dropping the hash
pub fn convert_to_domain_user(data_user: data_user::User) -> User {
    User {
        id: data_user.id,
        username: data_user.username,
        email: data_user.email,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_falls_back_to_stable() {
        let patient = convert_to_domain_patient(data_patient::Patient {
            patient_id: 3,
            name: "Alan".to_string(),
            age: 41,
            ward: "A1".to_string(),
            status: "admitted".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        });

        assert_eq!(patient.status, PatientStatus::Stable);
    }

    #[test]
    fn test_new_patient_requires_all_fields() {
        let request = CreatePatientRequest {
            name: Some("  Alan ".to_string()),
            age: None,
            ward: Some("A1".to_string()),
            status: None,
        };
        assert!(convert_to_data_new_patient(&request).is_none());

        let request = CreatePatientRequest { age: Some(41), ..request };
        let new_patient = convert_to_data_new_patient(&request).unwrap();
        assert_eq!(new_patient.name, "Alan");
        assert_eq!(new_patient.status, "stable");
    }
}
