use async_trait::async_trait;

use crate::database::DatabasePool;
use crate::models::patient::{NewPatient, Patient, PatientChanges};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for patient records
#[async_trait]
pub trait PatientRepositoryTrait: Send + Sync {
    /// All patients ordered by id
    async fn list(&self) -> Result<Vec<Patient>, RepositoryError>;

    /// Get a patient by id
    async fn get(&self, patient_id: i64) -> Result<Option<Patient>, RepositoryError>;

    /// Admit a new patient
    async fn create(&self, patient: NewPatient) -> Result<Patient, RepositoryError>;

    /// Apply a partial update, returning `None` if the patient does not exist
    async fn update(&self, patient_id: i64, changes: PatientChanges) -> Result<Option<Patient>, RepositoryError>;

    /// Discharge a patient, returning `false` if the patient does not exist
    async fn delete(&self, patient_id: i64) -> Result<bool, RepositoryError>;
}

/// Repository for patient records backed by the injected pool
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: DatabasePool,
}

impl PatientRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientRepositoryTrait for PatientRepository {
    async fn list(&self) -> Result<Vec<Patient>, RepositoryError> {
        DatabaseStorage::list_patients(&self.pool).await
    }

    async fn get(&self, patient_id: i64) -> Result<Option<Patient>, RepositoryError> {
        DatabaseStorage::get_patient(&self.pool, patient_id).await
    }

    async fn create(&self, patient: NewPatient) -> Result<Patient, RepositoryError> {
        DatabaseStorage::create_patient(&self.pool, &patient).await
    }

    async fn update(&self, patient_id: i64, changes: PatientChanges) -> Result<Option<Patient>, RepositoryError> {
        DatabaseStorage::update_patient(&self.pool, patient_id, &changes).await
    }

    async fn delete(&self, patient_id: i64) -> Result<bool, RepositoryError> {
        DatabaseStorage::delete_patient(&self.pool, patient_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStorage;

    fn new_patient(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            age: 67,
            ward: "ICU".to_string(),
            status: "critical".to_string(),
        }
    }

    fn backends() -> Vec<DatabasePool> {
        vec![
            DatabasePool::sqlite_in_memory().unwrap(),
            DatabasePool::Memory(InMemoryStorage::new()),
        ]
    }

    #[tokio::test]
    async fn test_create_and_get() {
        for pool in backends() {
            let repo = PatientRepository::new(pool);
            let created = repo.create(new_patient("Grace")).await.unwrap();

            assert!(created.patient_id > 0);
            assert_eq!(created.status, "critical");
            assert!(created.created_at.ends_with('Z'));

            let fetched = repo.get(created.patient_id).await.unwrap();
            assert_eq!(fetched, Some(created));
        }
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        for pool in backends() {
            let repo = PatientRepository::new(pool);
            let first = repo.create(new_patient("A")).await.unwrap();
            let second = repo.create(new_patient("B")).await.unwrap();

            let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|p| p.patient_id).collect();
            assert_eq!(ids, vec![first.patient_id, second.patient_id]);
        }
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_columns() {
        for pool in backends() {
            let repo = PatientRepository::new(pool);
            let created = repo.create(new_patient("Linus")).await.unwrap();

            let changes = PatientChanges {
                ward: Some("Recovery".to_string()),
                status: Some("recovering".to_string()),
                ..Default::default()
            };
            let updated = repo.update(created.patient_id, changes).await.unwrap().unwrap();

            assert_eq!(updated.name, "Linus");
            assert_eq!(updated.age, 67);
            assert_eq!(updated.ward, "Recovery");
            assert_eq!(updated.status, "recovering");
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_patient() {
        for pool in backends() {
            let repo = PatientRepository::new(pool);
            let changes = PatientChanges { age: Some(30), ..Default::default() };

            assert_eq!(repo.update(404, changes).await.unwrap(), None);
            assert!(!repo.delete(404).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_delete_removes_patient() {
        for pool in backends() {
            let repo = PatientRepository::new(pool);
            let created = repo.create(new_patient("Barbara")).await.unwrap();

            assert!(repo.delete(created.patient_id).await.unwrap());
            assert_eq!(repo.get(created.patient_id).await.unwrap(), None);
        }
    }
}
