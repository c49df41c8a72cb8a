use async_trait::async_trait;

use crate::database::DatabasePool;
use crate::models::vitals::{NewVitalsRecord, VitalsRecord};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for the append-only vitals history.
///
/// Readings are never updated or deleted here; every change to a patient's
/// vitals is a new row.
#[async_trait]
pub trait VitalsRepositoryTrait: Send + Sync {
    /// The most recent reading for a patient, if any
    async fn latest(&self, patient_id: i64) -> Result<Option<VitalsRecord>, RepositoryError>;

    /// All readings for a patient, oldest first
    async fn history(&self, patient_id: i64) -> Result<Vec<VitalsRecord>, RepositoryError>;

    /// The newest `limit` readings, newest first
    async fn recent(&self, patient_id: i64, limit: usize) -> Result<Vec<VitalsRecord>, RepositoryError>;

    /// Append a reading
    async fn insert(&self, record: NewVitalsRecord) -> Result<VitalsRecord, RepositoryError>;
}

/// Repository for vitals readings backed by the injected pool
#[derive(Debug, Clone)]
pub struct VitalsRepository {
    pool: DatabasePool,
}

impl VitalsRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VitalsRepositoryTrait for VitalsRepository {
    async fn latest(&self, patient_id: i64) -> Result<Option<VitalsRecord>, RepositoryError> {
        DatabaseStorage::latest_vitals(&self.pool, patient_id).await
    }

    async fn history(&self, patient_id: i64) -> Result<Vec<VitalsRecord>, RepositoryError> {
        DatabaseStorage::vitals_history(&self.pool, patient_id).await
    }

    async fn recent(&self, patient_id: i64, limit: usize) -> Result<Vec<VitalsRecord>, RepositoryError> {
        DatabaseStorage::recent_vitals(&self.pool, patient_id, limit).await
    }

    async fn insert(&self, record: NewVitalsRecord) -> Result<VitalsRecord, RepositoryError> {
        DatabaseStorage::insert_vitals(&self.pool, &record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::NewPatient;
    use crate::repository::{InMemoryStorage, PatientRepository, PatientRepositoryTrait};

    async fn admitted(pool: &DatabasePool) -> i64 {
        PatientRepository::new(pool.clone())
            .create(NewPatient {
                name: "Edsger".to_string(),
                age: 72,
                ward: "C1".to_string(),
                status: "stable".to_string(),
            })
            .await
            .unwrap()
            .patient_id
    }

    fn backends() -> Vec<DatabasePool> {
        vec![
            DatabasePool::sqlite_in_memory().unwrap(),
            DatabasePool::Memory(InMemoryStorage::new()),
        ]
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        for pool in backends() {
            let patient_id = admitted(&pool).await;
            let repo = VitalsRepository::new(pool);

            let inserted = repo.insert(NewVitalsRecord {
                patient_id,
                heart_rate: Some(80),
                spo2: Some(97),
                temperature: None,
            }).await.unwrap();

            assert!(inserted.id > 0);
            assert_eq!(inserted.patient_id, patient_id);
            assert_eq!(inserted.timestamp.len(), 24);
            assert_eq!(inserted.temperature, None);
        }
    }

    #[tokio::test]
    async fn test_insert_for_unknown_patient_is_not_found() {
        for pool in backends() {
            let repo = VitalsRepository::new(pool);
            let result = repo.insert(NewVitalsRecord {
                patient_id: 12345,
                temperature: Some(37.0),
                ..Default::default()
            }).await;

            assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        }
    }

    #[tokio::test]
    async fn test_history_latest_and_recent_agree() {
        for pool in backends() {
            let patient_id = admitted(&pool).await;
            let repo = VitalsRepository::new(pool);
            assert_eq!(repo.latest(patient_id).await.unwrap(), None);

            for hr in 60..65 {
                repo.insert(NewVitalsRecord {
                    patient_id,
                    heart_rate: Some(hr),
                    ..Default::default()
                }).await.unwrap();
            }

            let history = repo.history(patient_id).await.unwrap();
            assert_eq!(history.len(), 5);
            assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

            let latest = repo.latest(patient_id).await.unwrap();
            assert_eq!(history.last(), latest.as_ref());

            let recent = repo.recent(patient_id, 3).await.unwrap();
            let rates: Vec<Option<i64>> = recent.iter().map(|v| v.heart_rate).collect();
            assert_eq!(rates, vec![Some(64), Some(63), Some(62)]);
        }
    }

    #[tokio::test]
    async fn test_discharge_cascades_in_sqlite() {
        let pool = DatabasePool::sqlite_in_memory().unwrap();
        let patient_id = admitted(&pool).await;
        let repo = VitalsRepository::new(pool.clone());
        repo.insert(NewVitalsRecord { patient_id, spo2: Some(95), ..Default::default() }).await.unwrap();

        PatientRepository::new(pool).delete(patient_id).await.unwrap();

        assert!(repo.history(patient_id).await.unwrap().is_empty());
    }
}
