use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_patients_table(conn)?;
    create_vitals_table(conn)?;
    create_users_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the patients table
fn create_patients_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating patients table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS patients (
            patient_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            ward TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'stable',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
        [],
    ).map_err(|e| DatabaseError::MigrationError(format!("patients: {}", e)))?;

    Ok(())
}

/// Create the append-only vitals table and its lookup index
fn create_vitals_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating vitals table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS vitals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES patients (patient_id) ON DELETE CASCADE,
            timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            heart_rate INTEGER,
            spo2 INTEGER,
            temperature REAL
        )",
        [],
    ).map_err(|e| DatabaseError::MigrationError(format!("vitals: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_vitals_patient_timestamp
        ON vitals (patient_id, timestamp DESC)",
        [],
    ).map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    Ok(())
}

/// Create the users table
fn create_users_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating users table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            email TEXT
        )",
        [],
    ).map_err(|e| DatabaseError::MigrationError(format!("users: {}", e)))?;

    Ok(())
}
