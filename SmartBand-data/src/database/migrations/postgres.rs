use tokio_postgres::Client;
use tracing::info;

use crate::database::DatabaseError;

/// Timestamps are stored as RFC 3339 text so both backends sort them the same way
const NOW_UTC: &str = "to_char(clock_timestamp() AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS.MS\"Z\"')";

/// Run PostgreSQL database migrations
pub async fn run_migrations(client: &Client) -> Result<(), DatabaseError> {
    info!("Running PostgreSQL migrations");

    create_patients_table(client).await?;
    create_vitals_table(client).await?;
    create_users_table(client).await?;

    info!("PostgreSQL migrations completed successfully");
    Ok(())
}

/// Create the patients table
async fn create_patients_table(client: &Client) -> Result<(), DatabaseError> {
    info!("Creating patients table if not exists");

    client.execute(
        format!(
            "CREATE TABLE IF NOT EXISTS patients (
                patient_id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                age BIGINT NOT NULL,
                ward TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'stable',
                created_at TEXT NOT NULL DEFAULT {}
            )",
            NOW_UTC
        ).as_str(),
        &[],
    ).await.map_err(|e| DatabaseError::MigrationError(format!("patients: {}", e)))?;

    Ok(())
}

/// Create the append-only vitals table and its lookup index
async fn create_vitals_table(client: &Client) -> Result<(), DatabaseError> {
    info!("Creating vitals table if not exists");

    client.execute(
        format!(
            "CREATE TABLE IF NOT EXISTS vitals (
                id BIGSERIAL PRIMARY KEY,
                patient_id BIGINT NOT NULL REFERENCES patients (patient_id) ON DELETE CASCADE,
                timestamp TEXT NOT NULL DEFAULT {},
                heart_rate BIGINT,
                spo2 BIGINT,
                temperature DOUBLE PRECISION
            )",
            NOW_UTC
        ).as_str(),
        &[],
    ).await.map_err(|e| DatabaseError::MigrationError(format!("vitals: {}", e)))?;

    client.execute(
        "CREATE INDEX IF NOT EXISTS idx_vitals_patient_timestamp
        ON vitals (patient_id, timestamp DESC)",
        &[],
    ).await.map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    Ok(())
}

/// Create the users table
async fn create_users_table(client: &Client) -> Result<(), DatabaseError> {
    info!("Creating users table if not exists");

    client.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            email TEXT
        )",
        &[],
    ).await.map_err(|e| DatabaseError::MigrationError(format!("users: {}", e)))?;

    Ok(())
}
