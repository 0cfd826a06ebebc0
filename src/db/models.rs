use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Authenticity classification of a known medicine record.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MedicineStatus {
    Legal,
    Expired,
    Counterfeit,
    Recalled,
}

/// Outcome recorded for a scan attempt. Unlike [`MedicineStatus`] this includes
/// `NotFound`: a not-found scan is a log entry, never a stored record state.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Legal,
    Expired,
    Counterfeit,
    Recalled,
    NotFound,
}

impl MedicineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicineStatus::Legal => "legal",
            MedicineStatus::Expired => "expired",
            MedicineStatus::Counterfeit => "counterfeit",
            MedicineStatus::Recalled => "recalled",
        }
    }
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Legal => "legal",
            ScanStatus::Expired => "expired",
            ScanStatus::Counterfeit => "counterfeit",
            ScanStatus::Recalled => "recalled",
            ScanStatus::NotFound => "not_found",
        }
    }
}

impl fmt::Display for MedicineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MedicineStatus> for ScanStatus {
    fn from(status: MedicineStatus) -> Self {
        match status {
            MedicineStatus::Legal => ScanStatus::Legal,
            MedicineStatus::Expired => ScanStatus::Expired,
            MedicineStatus::Counterfeit => ScanStatus::Counterfeit,
            MedicineStatus::Recalled => ScanStatus::Recalled,
        }
    }
}

/// A reference record for a known medicine, keyed by its unique product code.
/// Records are immutable once inserted; there is no update or delete surface.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Medicine {
    pub code: String,
    pub name: String,
    pub manufacturer: String,
    pub batch_no: String,
    pub mfg_date: NaiveDate,
    pub exp_date: NaiveDate,
    pub license_no: String,
    pub status: MedicineStatus,
    pub country: String,
    pub composition: String,
    pub warnings: Vec<String>,
}

/// One entry in the append-only scan log. `medicine_name` is present only when
/// the scanned code resolved to a known record.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScanEvent {
    pub id: Uuid,
    pub medicine_code: String,
    pub status: ScanStatus,
    pub medicine_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate counts over both stores, recomputed on every call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStats {
    pub total_medicines: i64,
    pub total_scans: i64,
    pub legal_products: i64,
}
