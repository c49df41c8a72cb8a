use rusqlite::OptionalExtension;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::patient::{NewPatient, Patient, PatientChanges};
use crate::repository::RepositoryError;
use super::{patient_from_sqlite, DatabaseStorage, PATIENT_COLUMNS};

impl DatabaseStorage {
    /// All patients ordered by id
    pub async fn list_patients(pool: &DatabasePool) -> Result<Vec<Patient>, RepositoryError> {
        debug!("Listing patients");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM patients ORDER BY patient_id", PATIENT_COLUMNS
                ))?;
                let patients = stmt
                    .query_map([], patient_from_sqlite)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(patients)
            },

            DatabasePool::Memory(storage) => storage.list_patients(),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let rows = client.query(
                    format!("SELECT {} FROM patients ORDER BY patient_id", PATIENT_COLUMNS).as_str(),
                    &[],
                ).await?;
                Ok(rows.iter().map(super::pg::patient).collect())
            },
        }
    }

    /// Fetch one patient
    pub async fn get_patient(pool: &DatabasePool, patient_id: i64) -> Result<Option<Patient>, RepositoryError> {
        debug!("Getting patient from database: patient_id={}", patient_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let patient = conn.query_row(
                    &format!("SELECT {} FROM patients WHERE patient_id = ?1", PATIENT_COLUMNS),
                    [patient_id],
                    patient_from_sqlite,
                ).optional()?;
                Ok(patient)
            },

            DatabasePool::Memory(storage) => storage.get_patient(patient_id),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let row = client.query_opt(
                    format!("SELECT {} FROM patients WHERE patient_id = $1", PATIENT_COLUMNS).as_str(),
                    &[&patient_id],
                ).await?;
                Ok(row.as_ref().map(super::pg::patient))
            },
        }
    }

    /// Insert a patient; the store assigns the id and admission time
    pub async fn create_patient(pool: &DatabasePool, patient: &NewPatient) -> Result<Patient, RepositoryError> {
        debug!("Storing patient in database: name={}", patient.name);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let created = conn.query_row(
                    &format!(
                        "INSERT INTO patients (name, age, ward, status) VALUES (?1, ?2, ?3, ?4)
                         RETURNING {}",
                        PATIENT_COLUMNS
                    ),
                    (&patient.name, patient.age, &patient.ward, &patient.status),
                    patient_from_sqlite,
                )?;
                Ok(created)
            },

            DatabasePool::Memory(storage) => storage.create_patient(patient),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let row = client.query_one(
                    format!(
                        "INSERT INTO patients (name, age, ward, status) VALUES ($1, $2, $3, $4)
                         RETURNING {}",
                        PATIENT_COLUMNS
                    ).as_str(),
                    &[&patient.name, &patient.age, &patient.ward, &patient.status],
                ).await?;
                Ok(super::pg::patient(&row))
            },
        }
    }

    /// Apply a partial update; `None` when the patient does not exist
    pub async fn update_patient(
        pool: &DatabasePool,
        patient_id: i64,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, RepositoryError> {
        debug!("Updating patient in database: patient_id={}", patient_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let updated = conn.query_row(
                    &format!(
                        "UPDATE patients SET
                            name = COALESCE(?1, name),
                            age = COALESCE(?2, age),
                            ward = COALESCE(?3, ward),
                            status = COALESCE(?4, status)
                         WHERE patient_id = ?5
                         RETURNING {}",
                        PATIENT_COLUMNS
                    ),
                    (&changes.name, changes.age, &changes.ward, &changes.status, patient_id),
                    patient_from_sqlite,
                ).optional()?;
                Ok(updated)
            },

            DatabasePool::Memory(storage) => storage.update_patient(patient_id, changes),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let row = client.query_opt(
                    format!(
                        "UPDATE patients SET
                            name = COALESCE($1, name),
                            age = COALESCE($2, age),
                            ward = COALESCE($3, ward),
                            status = COALESCE($4, status)
                         WHERE patient_id = $5
                         RETURNING {}",
                        PATIENT_COLUMNS
                    ).as_str(),
                    &[&changes.name, &changes.age, &changes.ward, &changes.status, &patient_id],
                ).await?;
                Ok(row.as_ref().map(super::pg::patient))
            },
        }
    }

    /// Delete a patient; readings go with it through the foreign key cascade
    pub async fn delete_patient(pool: &DatabasePool, patient_id: i64) -> Result<bool, RepositoryError> {
        debug!("Deleting patient from database: patient_id={}", patient_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let deleted = conn.execute("DELETE FROM patients WHERE patient_id = ?1", [patient_id])?;
                Ok(deleted > 0)
            },

            DatabasePool::Memory(storage) => storage.delete_patient(patient_id),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let deleted = client.execute("DELETE FROM patients WHERE patient_id = $1", &[&patient_id]).await?;
                Ok(deleted > 0)
            },
        }
    }
}
