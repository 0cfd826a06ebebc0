use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;

pub mod medicines;
pub mod models;
pub mod scans;
pub mod seed;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to parse database URL: {0}")]
    UrlParse(String),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Failures shared by the reference table and the scan log.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Medicine code {code} already exists")]
    DuplicateCode { code: String },
    #[error("Invalid warnings payload: {0}")]
    Warnings(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CREATE_MEDICINES: &str = "\
CREATE TABLE IF NOT EXISTS medicines (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    manufacturer TEXT NOT NULL,
    batch_no TEXT NOT NULL,
    mfg_date TEXT NOT NULL,
    exp_date TEXT NOT NULL,
    license_no TEXT NOT NULL,
    status TEXT NOT NULL,
    country TEXT NOT NULL,
    composition TEXT NOT NULL,
    warnings TEXT NOT NULL
)";

const CREATE_SCANS: &str = "\
CREATE TABLE IF NOT EXISTS scans (
    id BLOB PRIMARY KEY,
    medicine_code TEXT NOT NULL,
    status TEXT NOT NULL,
    medicine_name TEXT,
    timestamp TEXT NOT NULL
)";

const CREATE_SCANS_TIMESTAMP_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_scans_timestamp ON scans (timestamp)";

/// Opens the SQLite database, creating the file and schema when missing.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| DatabaseError::UrlParse(e.to_string()))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    bootstrap_schema(&pool).await?;
    Ok(pool)
}

/// Idempotent schema bootstrap; safe to run on every startup.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::query(CREATE_MEDICINES).execute(pool).await?;
    sqlx::query(CREATE_SCANS).execute(pool).await?;
    sqlx::query(CREATE_SCANS_TIMESTAMP_INDEX).execute(pool).await?;
    Ok(())
}
