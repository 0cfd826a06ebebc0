//! Fixed sample dataset and the idempotent loader for it.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::fmt;

use super::medicines;
use super::models::{Medicine, MedicineStatus};
use super::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadySeeded,
}

impl fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedOutcome::Seeded(count) => write!(f, "Successfully seeded {} medicines", count),
            SeedOutcome::AlreadySeeded => f.write_str("Data already seeded"),
        }
    }
}

pub fn sample_medicines() -> Vec<Medicine> {
    vec![
        Medicine {
            code: "MED001234".to_string(),
            name: "Paracetamol 500mg".to_string(),
            manufacturer: "PharmaCorp Ltd.".to_string(),
            batch_no: "PC2024-A156".to_string(),
            mfg_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            exp_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            license_no: "DL-12345".to_string(),
            status: MedicineStatus::Legal,
            country: "India".to_string(),
            composition: "Paracetamol 500mg".to_string(),
            warnings: vec![],
        },
        Medicine {
            code: "MED005678".to_string(),
            name: "Amoxicillin 250mg".to_string(),
            manufacturer: "MediLife Pharma".to_string(),
            batch_no: "ML2023-B892".to_string(),
            mfg_date: NaiveDate::from_ymd_opt(2023, 6, 20).unwrap(),
            exp_date: NaiveDate::from_ymd_opt(2024, 6, 19).unwrap(),
            license_no: "DL-67890".to_string(),
            status: MedicineStatus::Expired,
            country: "India".to_string(),
            composition: "Amoxicillin Trihydrate 250mg".to_string(),
            warnings: vec!["Expired - Do not use".to_string()],
        },
        Medicine {
            code: "MED009999".to_string(),
            name: "Fake Aspirin".to_string(),
            manufacturer: "Unknown Source".to_string(),
            batch_no: "FAKE-001".to_string(),
            mfg_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            exp_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            license_no: "INVALID".to_string(),
            status: MedicineStatus::Counterfeit,
            country: "Unknown".to_string(),
            composition: "Unknown substances".to_string(),
            warnings: vec![
                "COUNTERFEIT DETECTED".to_string(),
                "Do not consume".to_string(),
                "Report immediately".to_string(),
            ],
        },
        Medicine {
            code: "MED002468".to_string(),
            name: "Ibuprofen 400mg".to_string(),
            manufacturer: "HealthPlus Industries".to_string(),
            batch_no: "HP2024-C234".to_string(),
            mfg_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            exp_date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            license_no: "DL-24680".to_string(),
            status: MedicineStatus::Recalled,
            country: "India".to_string(),
            composition: "Ibuprofen 400mg".to_string(),
            warnings: vec![
                "Product recalled due to quality concerns".to_string(),
                "Return to pharmacy".to_string(),
            ],
        },
        Medicine {
            code: "MED003579".to_string(),
            name: "Cetirizine 10mg".to_string(),
            manufacturer: "AllerCare Pharmaceuticals".to_string(),
            batch_no: "AC2024-D567".to_string(),
            mfg_date: NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            exp_date: NaiveDate::from_ymd_opt(2026, 2, 27).unwrap(),
            license_no: "DL-35790".to_string(),
            status: MedicineStatus::Legal,
            country: "India".to_string(),
            composition: "Cetirizine Hydrochloride 10mg".to_string(),
            warnings: vec![],
        },
    ]
}

/// Bulk-inserts the sample records. A no-op reporting [`SeedOutcome::AlreadySeeded`]
/// when any record is already present, so repeat runs never duplicate data.
pub async fn seed_database(pool: &SqlitePool) -> Result<SeedOutcome, StoreError> {
    if medicines::count(pool).await? > 0 {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let samples = sample_medicines();
    let total = samples.len();
    for medicine in &samples {
        medicines::insert(pool, medicine).await?;
    }

    log::info!("Seeded {} sample medicines", total);
    Ok(SeedOutcome::Seeded(total))
}
