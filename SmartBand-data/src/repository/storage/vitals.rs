use rusqlite::OptionalExtension;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::vitals::{NewVitalsRecord, VitalsRecord};
use crate::repository::RepositoryError;
use super::{vitals_from_sqlite, DatabaseStorage, VITALS_COLUMNS};

impl DatabaseStorage {
    /// The most recent reading by `(timestamp, id)`
    pub async fn latest_vitals(pool: &DatabasePool, patient_id: i64) -> Result<Option<VitalsRecord>, RepositoryError> {
        debug!("Getting latest vitals from database: patient_id={}", patient_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let latest = conn.query_row(
                    &format!(
                        "SELECT {} FROM vitals WHERE patient_id = ?1
                         ORDER BY timestamp DESC, id DESC LIMIT 1",
                        VITALS_COLUMNS
                    ),
                    [patient_id],
                    vitals_from_sqlite,
                ).optional()?;
                Ok(latest)
            },

            DatabasePool::Memory(storage) => storage.latest_vitals(patient_id),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let row = client.query_opt(
                    format!(
                        "SELECT {} FROM vitals WHERE patient_id = $1
                         ORDER BY timestamp DESC, id DESC LIMIT 1",
                        VITALS_COLUMNS
                    ).as_str(),
                    &[&patient_id],
                ).await?;
                Ok(row.as_ref().map(super::pg::vitals))
            },
        }
    }

    /// Every reading for a patient, oldest first
    pub async fn vitals_history(pool: &DatabasePool, patient_id: i64) -> Result<Vec<VitalsRecord>, RepositoryError> {
        debug!("Getting vitals history from database: patient_id={}", patient_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM vitals WHERE patient_id = ?1 ORDER BY timestamp ASC, id ASC",
                    VITALS_COLUMNS
                ))?;
                let history = stmt
                    .query_map([patient_id], vitals_from_sqlite)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(history)
            },

            DatabasePool::Memory(storage) => storage.vitals_history(patient_id),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let rows = client.query(
                    format!(
                        "SELECT {} FROM vitals WHERE patient_id = $1 ORDER BY timestamp ASC, id ASC",
                        VITALS_COLUMNS
                    ).as_str(),
                    &[&patient_id],
                ).await?;
                Ok(rows.iter().map(super::pg::vitals).collect())
            },
        }
    }

    /// The newest `limit` readings, newest first
    pub async fn recent_vitals(
        pool: &DatabasePool,
        patient_id: i64,
        limit: usize,
    ) -> Result<Vec<VitalsRecord>, RepositoryError> {
        debug!("Getting recent vitals from database: patient_id={}, limit={}", patient_id, limit);
        let sql_limit = i64::try_from(limit).unwrap_or(i64::MAX);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM vitals WHERE patient_id = ?1
                     ORDER BY timestamp DESC, id DESC LIMIT ?2",
                    VITALS_COLUMNS
                ))?;
                let recent = stmt
                    .query_map((patient_id, sql_limit), vitals_from_sqlite)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(recent)
            },

            DatabasePool::Memory(storage) => storage.recent_vitals(patient_id, limit),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let rows = client.query(
                    format!(
                        "SELECT {} FROM vitals WHERE patient_id = $1
                         ORDER BY timestamp DESC, id DESC LIMIT $2",
                        VITALS_COLUMNS
                    ).as_str(),
                    &[&patient_id, &sql_limit],
                ).await?;
                Ok(rows.iter().map(super::pg::vitals).collect())
            },
        }
    }

    /// Append a reading; the store assigns `id` and `timestamp`
    pub async fn insert_vitals(pool: &DatabasePool, record: &NewVitalsRecord) -> Result<VitalsRecord, RepositoryError> {
        debug!("Appending vitals in database: patient_id={}", record.patient_id);
        let missing_patient = format!("patient {}", record.patient_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let inserted = conn.query_row(
                    &format!(
                        "INSERT INTO vitals (patient_id, heart_rate, spo2, temperature)
                         VALUES (?1, ?2, ?3, ?4)
                         RETURNING {}",
                        VITALS_COLUMNS
                    ),
                    (record.patient_id, record.heart_rate, record.spo2, record.temperature),
                    vitals_from_sqlite,
                ).map_err(|e| RepositoryError::from_sqlite_constraint(e, &missing_patient))?;
                Ok(inserted)
            },

            DatabasePool::Memory(storage) => storage.insert_vitals(record),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let row = client.query_one(
                    format!(
                        "INSERT INTO vitals (patient_id, heart_rate, spo2, temperature)
                         VALUES ($1, $2, $3, $4)
                         RETURNING {}",
                        VITALS_COLUMNS
                    ).as_str(),
                    &[&record.patient_id, &record.heart_rate, &record.spo2, &record.temperature],
                ).await
                .map_err(|e| RepositoryError::from_postgres_constraint(e, &missing_patient))?;
                Ok(super::pg::vitals(&row))
            },
        }
    }
}
