//! SQL for each supported backend.
//!
//! `DatabaseStorage` is stateless: every operation receives the pool and
//! dispatches on its variant. The in-memory variant delegates to
//! [`InMemoryStorage`](super::InMemoryStorage).

mod patients;
mod users;
mod vitals;

use crate::models::patient::Patient;
use crate::models::user::User;
use crate::models::vitals::VitalsRecord;

/// Database storage operations for patients, vitals and users
pub struct DatabaseStorage;

const PATIENT_COLUMNS: &str = "patient_id, name, age, ward, status, created_at";
const VITALS_COLUMNS: &str = "id, patient_id, timestamp, heart_rate, spo2, temperature";
const USER_COLUMNS: &str = "id, username, password, email";

fn patient_from_sqlite(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        ward: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn vitals_from_sqlite(row: &rusqlite::Row<'_>) -> rusqlite::Result<VitalsRecord> {
    Ok(VitalsRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        timestamp: row.get(2)?,
        heart_rate: row.get(3)?,
        spo2: row.get(4)?,
        temperature: row.get(5)?,
    })
}

fn user_from_sqlite(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
    })
}

#[cfg(feature = "postgres")]
mod pg {
    use super::*;
    use crate::database::DatabaseError;
    use crate::repository::RepositoryError;

    pub(super) async fn client(
        pool: &deadpool_postgres::Pool,
    ) -> Result<deadpool_postgres::Object, RepositoryError> {
        pool.get().await
            .map_err(|e| RepositoryError::Database(DatabaseError::ConnectionError(e.to_string())))
    }

    pub(super) fn patient(row: &tokio_postgres::Row) -> Patient {
        Patient {
            patient_id: row.get(0),
            name: row.get(1),
            age: row.get(2),
            ward: row.get(3),
            status: row.get(4),
            created_at: row.get(5),
        }
    }

    pub(super) fn vitals(row: &tokio_postgres::Row) -> VitalsRecord {
        VitalsRecord {
            id: row.get(0),
            patient_id: row.get(1),
            timestamp: row.get(2),
            heart_rate: row.get(3),
            spo2: row.get(4),
            temperature: row.get(5),
        }
    }

    pub(super) fn user(row: &tokio_postgres::Row) -> User {
        User {
            id: row.get(0),
            username: row.get(1),
            password_hash: row.get(2),
            email: row.get(3),
        }
    }
}
