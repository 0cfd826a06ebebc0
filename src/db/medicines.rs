//! Reference store queries. Lookup is exact-match on the unique code; there is
//! no partial or fuzzy matching.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::models::{Medicine, MedicineStatus};
use super::StoreError;

const MEDICINE_COLUMNS: &str = "code, name, manufacturer, batch_no, mfg_date, exp_date, \
     license_no, status, country, composition, warnings";

/// Row shape with the warnings column still as raw JSON text.
#[derive(sqlx::FromRow)]
struct MedicineRow {
    code: String,
    name: String,
    manufacturer: String,
    batch_no: String,
    mfg_date: NaiveDate,
    exp_date: NaiveDate,
    license_no: String,
    status: MedicineStatus,
    country: String,
    composition: String,
    warnings: String,
}

impl MedicineRow {
    fn into_medicine(self) -> Result<Medicine, StoreError> {
        let warnings: Vec<String> = serde_json::from_str(&self.warnings)?;
        Ok(Medicine {
            code: self.code,
            name: self.name,
            manufacturer: self.manufacturer,
            batch_no: self.batch_no,
            mfg_date: self.mfg_date,
            exp_date: self.exp_date,
            license_no: self.license_no,
            status: self.status,
            country: self.country,
            composition: self.composition,
            warnings,
        })
    }
}

/// Exact-match retrieval by code. Absence is a normal result, not an error.
pub async fn get_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Medicine>, StoreError> {
    let query = format!("SELECT {} FROM medicines WHERE code = $1", MEDICINE_COLUMNS);
    let row = sqlx::query_as::<_, MedicineRow>(&query)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    row.map(MedicineRow::into_medicine).transpose()
}

/// Inserts a new record. A colliding code maps to [`StoreError::DuplicateCode`].
pub async fn insert(pool: &SqlitePool, medicine: &Medicine) -> Result<(), StoreError> {
    let warnings = serde_json::to_string(&medicine.warnings)?;
    let query = format!(
        "INSERT INTO medicines ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        MEDICINE_COLUMNS
    );
    sqlx::query(&query)
        .bind(&medicine.code)
        .bind(&medicine.name)
        .bind(&medicine.manufacturer)
        .bind(&medicine.batch_no)
        .bind(medicine.mfg_date)
        .bind(medicine.exp_date)
        .bind(&medicine.license_no)
        .bind(medicine.status)
        .bind(&medicine.country)
        .bind(&medicine.composition)
        .bind(&warnings)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateCode {
                code: medicine.code.clone(),
            },
            _ => StoreError::Sqlx(e),
        })?;
    Ok(())
}

/// All records, in insertion order. Used for aggregate counting and admin views.
pub async fn list(pool: &SqlitePool) -> Result<Vec<Medicine>, StoreError> {
    let query = format!("SELECT {} FROM medicines ORDER BY rowid", MEDICINE_COLUMNS);
    let rows = sqlx::query_as::<_, MedicineRow>(&query)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(MedicineRow::into_medicine).collect()
}

pub async fn count(pool: &SqlitePool) -> Result<i64, StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn legal_count(pool: &SqlitePool) -> Result<i64, StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines WHERE status = $1")
        .bind(MedicineStatus::Legal)
        .fetch_one(pool)
        .await?;
    Ok(total)
}
