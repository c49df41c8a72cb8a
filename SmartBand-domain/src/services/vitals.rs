//! Vitals History Merger.
//!
//! A vitals update may carry any subset of heart rate, SpO2 and temperature.
//! Rather than overwrite the patient's last reading, the update is merged
//! with it and appended as a new row:
//!
//! 1. reject an update that carries no vital sign at all
//! 2. coerce each supplied value to its numeric type
//! 3. require the patient to exist
//! 4. load the patient's most recent reading
//! 5. take each field from the update, falling back to the latest reading
//! 6. insert the result; the store stamps `id` and `timestamp`
//!
//! Exactly one row is appended per successful call and no existing row is
//! touched.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use smart_band_data::repository::{PatientRepositoryTrait, VitalsRepositoryTrait};

use crate::entities::conversions;
use crate::entities::vitals::{NewVitals, VitalsReading, VitalsRecord, VitalsUpdate};
use crate::services::errors::ServiceError;

/// Message returned when an update carries no vital sign
pub const EMPTY_VITALS_UPDATE: &str = "At least one of heart_rate, spo2 or temperature is required";

/// Readings returned by `recent_vitals` when the caller gives no limit
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Upper bound for `recent_vitals`; larger limits are lowered to it
pub const MAX_RECENT_LIMIT: usize = 100;

/// Message returned for `recent_vitals` with a limit of zero
pub const ZERO_RECENT_LIMIT: &str = "limit must be at least 1";

/// Trait for vitals service operations
#[async_trait]
pub trait VitalsServiceTrait: Send + Sync {
    /// Merge a partial update with the latest reading and append the result
    async fn record_vitals(&self, patient_id: i64, update: VitalsUpdate) -> Result<VitalsRecord, ServiceError>;

    /// The most recent reading for a patient
    async fn latest_vitals(&self, patient_id: i64) -> Result<VitalsRecord, ServiceError>;

    /// Every reading for a patient, oldest first
    async fn vitals_history(&self, patient_id: i64) -> Result<Vec<VitalsRecord>, ServiceError>;

    /// The newest readings for a patient, newest first
    async fn recent_vitals(&self, patient_id: i64, limit: usize) -> Result<Vec<VitalsRecord>, ServiceError>;
}

/// Vitals service for domain logic
pub struct VitalsService<P: PatientRepositoryTrait, V: VitalsRepositoryTrait> {
    patients: P,
    vitals: V,
}

impl<P: PatientRepositoryTrait, V: VitalsRepositoryTrait> VitalsService<P, V> {
    /// Create a new vitals service
    pub fn new(patients: P, vitals: V) -> Self {
        Self { patients, vitals }
    }

    async fn require_patient(&self, patient_id: i64) -> Result<(), ServiceError> {
        match self.patients.get(patient_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!("Patient {} not found", patient_id))),
        }
    }
}

/// Combine a coerced update with the latest stored reading.
///
/// A supplied value always wins; otherwise the latest reading's value is
/// carried forward; otherwise the field stays empty.
pub fn merge_vitals(patient_id: i64, update: &VitalsReading, latest: Option<&VitalsRecord>) -> NewVitals {
    NewVitals {
        patient_id,
        heart_rate: update.heart_rate.or_else(|| latest.and_then(|l| l.heart_rate)),
        spo2: update.spo2.or_else(|| latest.and_then(|l| l.spo2)),
        temperature: update.temperature.or_else(|| latest.and_then(|l| l.temperature)),
    }
}

/// Coerce the raw update into typed values
pub fn coerce_update(update: &VitalsUpdate) -> Result<VitalsReading, ServiceError> {
    if update.is_empty() {
        return Err(ServiceError::Validation(EMPTY_VITALS_UPDATE.to_string()));
    }

    Ok(VitalsReading {
        heart_rate: update.heart_rate.as_ref().map(|v| coerce_integer("heart_rate", v)).transpose()?,
        spo2: update.spo2.as_ref().map(|v| coerce_integer("spo2", v)).transpose()?,
        temperature: update.temperature.as_ref().map(|v| coerce_float("temperature", v)).transpose()?,
    })
}

/// Read the patient id a sensor gateway sends alongside its reading.
///
/// Zero, blank strings and `false` count as missing, like an absent key.
pub fn coerce_patient_id(value: Option<&Value>) -> Result<i64, ServiceError> {
    let missing = || ServiceError::Validation("Missing patient_id".to_string());

    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(missing()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(missing()),
        Some(Value::String(s)) if s.trim().is_empty() => Err(missing()),
        Some(v) => coerce_integer("patient_id", v),
    }
}

/// Integers pass through, finite fractions truncate toward zero and
/// strings are parsed after trimming
fn coerce_integer(field: &str, value: &Value) -> Result<i64, ServiceError> {
    let invalid = || ServiceError::Validation(format!("{} must be an integer", field));

    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            None => {
                let f = n.as_f64().filter(|f| f.is_finite()).ok_or_else(invalid)?;
                let truncated = f.trunc();
                if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                    return Err(invalid());
                }
                Ok(truncated as i64)
            }
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn coerce_float(field: &str, value: &Value) -> Result<f64, ServiceError> {
    let invalid = || ServiceError::Validation(format!("{} must be a number", field));

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|f| f.is_finite()).ok_or_else(invalid)
}

#[async_trait]
impl<P, V> VitalsServiceTrait for VitalsService<P, V>
where
    P: PatientRepositoryTrait,
    V: VitalsRepositoryTrait,
{
    async fn record_vitals(&self, patient_id: i64, update: VitalsUpdate) -> Result<VitalsRecord, ServiceError> {
        let reading = coerce_update(&update).map_err(|e| {
            warn!("Rejected vitals update for patient {}: {}", patient_id, e);
            e
        })?;

        self.require_patient(patient_id).await?;

        let latest = self.vitals.latest(patient_id)
            .await?
            .map(conversions::convert_to_domain_vitals);
        debug!("Merging vitals for patient {} onto {:?}", patient_id, latest.as_ref().map(|l| l.id));

        let merged = merge_vitals(patient_id, &reading, latest.as_ref());
        let inserted = self.vitals.insert(conversions::convert_to_data_new_vitals(&merged)).await?;
        info!("Appended vitals {} for patient {}", inserted.id, patient_id);

        Ok(conversions::convert_to_domain_vitals(inserted))
    }

    async fn latest_vitals(&self, patient_id: i64) -> Result<VitalsRecord, ServiceError> {
        self.vitals.latest(patient_id)
            .await?
            .map(conversions::convert_to_domain_vitals)
            .ok_or_else(|| ServiceError::NotFound("No vitals found".to_string()))
    }

    async fn vitals_history(&self, patient_id: i64) -> Result<Vec<VitalsRecord>, ServiceError> {
        self.require_patient(patient_id).await?;
        let history = self.vitals.history(patient_id).await?;
        Ok(history.into_iter().map(conversions::convert_to_domain_vitals).collect())
    }

    async fn recent_vitals(&self, patient_id: i64, limit: usize) -> Result<Vec<VitalsRecord>, ServiceError> {
        if limit == 0 {
            return Err(ServiceError::Validation(ZERO_RECENT_LIMIT.to_string()));
        }
        self.require_patient(patient_id).await?;
        let limit = limit.min(MAX_RECENT_LIMIT);
        let recent = self.vitals.recent(patient_id, limit).await?;
        Ok(recent.into_iter().map(conversions::convert_to_domain_vitals).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use serde_json::json;

    use smart_band_data::database::DatabasePool;
    use smart_band_data::models::patient::{NewPatient, Patient, PatientChanges};
    use smart_band_data::models::vitals::{NewVitalsRecord, VitalsRecord as DataVitalsRecord};
    use smart_band_data::repository::{InMemoryStorage, PatientRepository, RepositoryError, VitalsRepository};

    mock! {
        pub Patients {}

        #[async_trait]
        impl PatientRepositoryTrait for Patients {
            async fn list(&self) -> Result<Vec<Patient>, RepositoryError>;
            async fn get(&self, patient_id: i64) -> Result<Option<Patient>, RepositoryError>;
            async fn create(&self, patient: NewPatient) -> Result<Patient, RepositoryError>;
            async fn update(&self, patient_id: i64, changes: PatientChanges) -> Result<Option<Patient>, RepositoryError>;
            async fn delete(&self, patient_id: i64) -> Result<bool, RepositoryError>;
        }
    }

    mock! {
        pub Vitals {}

        #[async_trait]
        impl VitalsRepositoryTrait for Vitals {
            async fn latest(&self, patient_id: i64) -> Result<Option<DataVitalsRecord>, RepositoryError>;
            async fn history(&self, patient_id: i64) -> Result<Vec<DataVitalsRecord>, RepositoryError>;
            async fn recent(&self, patient_id: i64, limit: usize) -> Result<Vec<DataVitalsRecord>, RepositoryError>;
            async fn insert(&self, record: NewVitalsRecord) -> Result<DataVitalsRecord, RepositoryError>;
        }
    }

    fn patient(patient_id: i64) -> Patient {
        Patient {
            patient_id,
            name: "Florence".to_string(),
            age: 34,
            ward: "A3".to_string(),
            status: "stable".to_string(),
            created_at: "2024-05-12T08:00:00.000Z".to_string(),
        }
    }

    fn stored(id: i64, record: &NewVitalsRecord) -> DataVitalsRecord {
        DataVitalsRecord {
            id,
            patient_id: record.patient_id,
            timestamp: "2024-05-12T09:00:00.000Z".to_string(),
            heart_rate: record.heart_rate,
            spo2: record.spo2,
            temperature: record.temperature,
        }
    }

    fn existing_patient(patient_id: i64) -> MockPatients {
        let mut patients = MockPatients::new();
        patients.expect_get()
            .with(eq(patient_id))
            .returning(|id| Ok(Some(patient(id))));
        patients
    }

    #[test]
    fn test_merge_without_history_keeps_only_supplied_fields() {
        let update = VitalsReading { spo2: Some(98), ..Default::default() };

        let merged = merge_vitals(4, &update, None);

        assert_eq!(merged, NewVitals { patient_id: 4, spo2: Some(98), ..Default::default() });
    }

    #[test]
    fn test_merge_carries_forward_unsupplied_fields() {
        let latest = VitalsRecord {
            id: 10,
            patient_id: 7,
            timestamp: "2024-05-12T09:00:00.000Z".to_string(),
            heart_rate: Some(80),
            spo2: Some(97),
            temperature: Some(37.2),
        };
        let update = VitalsReading { heart_rate: Some(95), ..Default::default() };

        let merged = merge_vitals(7, &update, Some(&latest));

        assert_eq!(merged.heart_rate, Some(95));
        assert_eq!(merged.spo2, Some(97));
        assert_eq!(merged.temperature, Some(37.2));
    }

    #[test]
    fn test_coercion_rules() {
        let update = VitalsUpdate {
            heart_rate: Some(json!(" 80 ")),
            spo2: Some(json!(96.9)),
            temperature: Some(json!("36.6")),
        };
        let reading = coerce_update(&update).unwrap();
        assert_eq!(reading.heart_rate, Some(80));
        assert_eq!(reading.spo2, Some(96));
        assert_eq!(reading.temperature, Some(36.6));

        let negative = VitalsUpdate { heart_rate: Some(json!(-3.7)), ..Default::default() };
        assert_eq!(coerce_update(&negative).unwrap().heart_rate, Some(-3));

        for bad in [json!(true), json!([80]), json!({"bpm": 80}), json!("eighty"), json!("80.5")] {
            let update = VitalsUpdate { heart_rate: Some(bad), ..Default::default() };
            assert_eq!(
                coerce_update(&update).unwrap_err(),
                ServiceError::Validation("heart_rate must be an integer".to_string())
            );
        }

        let update = VitalsUpdate { temperature: Some(json!("NaN")), ..Default::default() };
        assert!(matches!(coerce_update(&update), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_null_fields_count_as_absent() {
        let update: VitalsUpdate = serde_json::from_value(json!({
            "heart_rate": null,
            "spo2": null
        })).unwrap();

        assert_eq!(
            coerce_update(&update).unwrap_err(),
            ServiceError::Validation(EMPTY_VITALS_UPDATE.to_string())
        );
    }

    #[test]
    fn test_coerce_patient_id() {
        assert_eq!(coerce_patient_id(Some(&json!("12"))).unwrap(), 12);
        assert_eq!(coerce_patient_id(Some(&json!(12))).unwrap(), 12);
        assert_eq!(
            coerce_patient_id(None).unwrap_err(),
            ServiceError::Validation("Missing patient_id".to_string())
        );
    }

    #[test]
    fn test_falsy_patient_ids_count_as_missing() {
        for falsy in [json!(0), json!(0.0), json!(""), json!("  "), json!(false), json!(null)] {
            assert_eq!(
                coerce_patient_id(Some(&falsy)).unwrap_err(),
                ServiceError::Validation("Missing patient_id".to_string()),
                "{} should count as missing",
                falsy
            );
        }

        assert_eq!(
            coerce_patient_id(Some(&json!("abc"))).unwrap_err(),
            ServiceError::Validation("patient_id must be an integer".to_string())
        );
    }

    #[tokio::test]
    async fn test_record_vitals_appends_exactly_one_merged_row() {
        let patients = existing_patient(7);

        let mut vitals = MockVitals::new();
        vitals.expect_latest()
            .with(eq(7))
            .times(1)
            .returning(|_| Ok(Some(DataVitalsRecord {
                id: 1,
                patient_id: 7,
                timestamp: "2024-05-12T08:30:00.000Z".to_string(),
                heart_rate: Some(80),
                spo2: Some(97),
                temperature: None,
            })));
        vitals.expect_insert()
            .withf(|r| {
                r.patient_id == 7
                    && r.heart_rate == Some(80)
                    && r.spo2 == Some(97)
                    && r.temperature == Some(36.6)
            })
            .times(1)
            .returning(|r| Ok(stored(2, &r)));
        vitals.expect_history().never();

        let service = VitalsService::new(patients, vitals);
        let update = VitalsUpdate { temperature: Some(json!(36.6)), ..Default::default() };

        let record = service.record_vitals(7, update).await.unwrap();

        assert_eq!(record.id, 2);
        assert_eq!(record.heart_rate, Some(80));
        assert_eq!(record.spo2, Some(97));
        assert_eq!(record.temperature, Some(36.6));
    }

    #[tokio::test]
    async fn test_record_vitals_for_missing_patient_inserts_nothing() {
        let mut patients = MockPatients::new();
        patients.expect_get().returning(|_| Ok(None));

        let mut vitals = MockVitals::new();
        vitals.expect_latest().never();
        vitals.expect_insert().never();

        let service = VitalsService::new(patients, vitals);
        let update = VitalsUpdate { heart_rate: Some(json!(72)), ..Default::default() };

        let err = service.record_vitals(404, update).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound("Patient 404 not found".to_string()));
    }

    #[tokio::test]
    async fn test_record_vitals_validates_before_touching_the_store() {
        let mut patients = MockPatients::new();
        patients.expect_get().never();

        let mut vitals = MockVitals::new();
        vitals.expect_insert().never();

        let service = VitalsService::new(patients, vitals);

        let empty = service.record_vitals(7, VitalsUpdate::default()).await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));

        let bad = VitalsUpdate { spo2: Some(json!("high")), ..Default::default() };
        assert!(matches!(service.record_vitals(7, bad).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_recent_vitals_clamps_limit() {
        let patients = existing_patient(3);

        let mut vitals = MockVitals::new();
        vitals.expect_recent()
            .with(eq(3), eq(MAX_RECENT_LIMIT))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = VitalsService::new(patients, vitals);
        assert!(service.recent_vitals(3, 5000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_vitals_rejects_zero_limit() {
        let mut vitals = MockVitals::new();
        vitals.expect_recent().times(0);

        let service = VitalsService::new(MockPatients::new(), vitals);
        assert_eq!(
            service.recent_vitals(3, 0).await.unwrap_err(),
            ServiceError::Validation(ZERO_RECENT_LIMIT.to_string())
        );
    }

    #[tokio::test]
    async fn test_history_grows_and_latest_matches_last_entry() {
        let pool = DatabasePool::Memory(InMemoryStorage::new());
        let patient_id = PatientRepository::new(pool.clone())
            .create(NewPatient {
                name: "Mary".to_string(),
                age: 29,
                ward: "Maternity".to_string(),
                status: "stable".to_string(),
            })
            .await
            .unwrap()
            .patient_id;
        let service = VitalsService::new(PatientRepository::new(pool.clone()), VitalsRepository::new(pool));

        service.record_vitals(patient_id, VitalsUpdate {
            heart_rate: Some(json!(80)),
            spo2: Some(json!(97)),
            ..Default::default()
        }).await.unwrap();
        service.record_vitals(patient_id, VitalsUpdate {
            temperature: Some(json!(36.6)),
            ..Default::default()
        }).await.unwrap();
        service.record_vitals(patient_id, VitalsUpdate {
            heart_rate: Some(json!("88")),
            ..Default::default()
        }).await.unwrap();

        let history = service.vitals_history(patient_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(history[1].heart_rate, Some(80));
        assert_eq!(history[1].spo2, Some(97));
        assert_eq!(history[1].temperature, Some(36.6));

        let latest = service.latest_vitals(patient_id).await.unwrap();
        assert_eq!(Some(&latest), history.last());
        assert_eq!(latest.heart_rate, Some(88));
        assert_eq!(latest.temperature, Some(36.6));
    }
}
