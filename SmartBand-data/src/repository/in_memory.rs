use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::models::patient::{NewPatient, Patient, PatientChanges};
use crate::models::user::{NewUser, User};
use crate::models::vitals::{NewVitalsRecord, VitalsRecord};
use super::errors::RepositoryError;

/// Format shared with the SQL defaults, so both backends sort timestamps alike
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Default)]
struct MemoryState {
    patients: HashMap<i64, Patient>,
    vitals: Vec<VitalsRecord>,
    users: HashMap<String, User>,
    next_patient_id: i64,
    next_vitals_id: i64,
    next_user_id: i64,
}

/// In-memory storage for patients, vitals and users.
///
/// Clones share the same state, so a single instance can back every
/// repository built from one `DatabasePool::Memory`.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new, empty in-memory storage
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    pub fn list_patients(&self) -> Result<Vec<Patient>, RepositoryError> {
        let state = self.state.lock()?;
        let mut patients: Vec<Patient> = state.patients.values().cloned().collect();
        patients.sort_by_key(|p| p.patient_id);
        Ok(patients)
    }

    pub fn get_patient(&self, patient_id: i64) -> Result<Option<Patient>, RepositoryError> {
        let state = self.state.lock()?;
        Ok(state.patients.get(&patient_id).cloned())
    }

    pub fn create_patient(&self, patient: &NewPatient) -> Result<Patient, RepositoryError> {
        let mut state = self.state.lock()?;
        state.next_patient_id += 1;

        let created = Patient {
            patient_id: state.next_patient_id,
            name: patient.name.clone(),
            age: patient.age,
            ward: patient.ward.clone(),
            status: patient.status.clone(),
            created_at: now_timestamp(),
        };
        state.patients.insert(created.patient_id, created.clone());

        Ok(created)
    }

    pub fn update_patient(
        &self,
        patient_id: i64,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, RepositoryError> {
        let mut state = self.state.lock()?;
        match state.patients.get_mut(&patient_id) {
            Some(patient) => {
                changes.apply_to(patient);
                Ok(Some(patient.clone()))
            }
            None => Ok(None),
        }
    }

    /// Remove a patient and cascade to its readings
    pub fn delete_patient(&self, patient_id: i64) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock()?;
        if state.patients.remove(&patient_id).is_none() {
            return Ok(false);
        }
        state.vitals.retain(|v| v.patient_id != patient_id);
        Ok(true)
    }

    /// Readings for a patient in `(timestamp, id)` order
    pub fn vitals_history(&self, patient_id: i64) -> Result<Vec<VitalsRecord>, RepositoryError> {
        let state = self.state.lock()?;
        let mut history: Vec<VitalsRecord> = state.vitals
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(history)
    }

    pub fn latest_vitals(&self, patient_id: i64) -> Result<Option<VitalsRecord>, RepositoryError> {
        Ok(self.vitals_history(patient_id)?.pop())
    }

    pub fn recent_vitals(&self, patient_id: i64, limit: usize) -> Result<Vec<VitalsRecord>, RepositoryError> {
        let mut history = self.vitals_history(patient_id)?;
        history.reverse();
        history.truncate(limit);
        Ok(history)
    }

    pub fn insert_vitals(&self, record: &NewVitalsRecord) -> Result<VitalsRecord, RepositoryError> {
        let mut state = self.state.lock()?;
        if !state.patients.contains_key(&record.patient_id) {
            return Err(RepositoryError::NotFound(format!("patient {}", record.patient_id)));
        }
        state.next_vitals_id += 1;

        let inserted = VitalsRecord {
            id: state.next_vitals_id,
            patient_id: record.patient_id,
            timestamp: now_timestamp(),
            heart_rate: record.heart_rate,
            spo2: record.spo2,
            temperature: record.temperature,
        };
        state.vitals.push(inserted.clone());

        Ok(inserted)
    }

    pub fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut state = self.state.lock()?;
        if state.users.contains_key(&user.username) {
            return Err(RepositoryError::Conflict(format!("username {}", user.username)));
        }
        state.next_user_id += 1;

        let created = User {
            id: state.next_user_id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            email: user.email.clone(),
        };
        state.users.insert(created.username.clone(), created.clone());

        Ok(created)
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock()?;
        Ok(state.users.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ward_patient(storage: &InMemoryStorage) -> Patient {
        storage.create_patient(&NewPatient {
            name: "Ada".to_string(),
            age: 41,
            ward: "B2".to_string(),
            status: "stable".to_string(),
        }).unwrap()
    }

    #[test]
    fn test_clones_share_state() {
        let storage = InMemoryStorage::new();
        let other = storage.clone();
        let patient = ward_patient(&storage);

        assert_eq!(other.get_patient(patient.patient_id).unwrap(), Some(patient));
    }

    #[test]
    fn test_insert_vitals_requires_patient() {
        let storage = InMemoryStorage::new();
        let result = storage.insert_vitals(&NewVitalsRecord {
            patient_id: 99,
            heart_rate: Some(70),
            ..Default::default()
        });

        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_latest_is_last_of_history() {
        let storage = InMemoryStorage::new();
        let patient = ward_patient(&storage);
        for hr in [70, 72, 75] {
            storage.insert_vitals(&NewVitalsRecord {
                patient_id: patient.patient_id,
                heart_rate: Some(hr),
                ..Default::default()
            }).unwrap();
        }

        let history = storage.vitals_history(patient.patient_id).unwrap();
        let latest = storage.latest_vitals(patient.patient_id).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.last(), latest.as_ref());
        assert_eq!(latest.unwrap().heart_rate, Some(75));

        let recent = storage.recent_vitals(patient.patient_id, 2).unwrap();
        assert_eq!(recent.iter().map(|v| v.heart_rate).collect::<Vec<_>>(), vec![Some(75), Some(72)]);
    }

    #[test]
    fn test_delete_cascades_to_vitals() {
        let storage = InMemoryStorage::new();
        let patient = ward_patient(&storage);
        storage.insert_vitals(&NewVitalsRecord {
            patient_id: patient.patient_id,
            spo2: Some(97),
            ..Default::default()
        }).unwrap();

        assert!(storage.delete_patient(patient.patient_id).unwrap());
        assert!(!storage.delete_patient(patient.patient_id).unwrap());
        assert!(storage.vitals_history(patient.patient_id).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let storage = InMemoryStorage::new();
        let user = NewUser {
            username: "nurse".to_string(),
            password_hash: "hash".to_string(),
            email: None,
        };
        storage.create_user(&user).unwrap();

        assert!(matches!(storage.create_user(&user), Err(RepositoryError::Conflict(_))));
    }
}
