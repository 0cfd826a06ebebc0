use medscan::db::models::{Medicine, MedicineStatus, ScanStatus};
use medscan::db::seed::{seed_database, SeedOutcome};
use medscan::db::{self, medicines, scans, StoreError};
use medscan::services::{self, Verification, VerifyError};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

// A single shared in-memory connection: every connection to "sqlite::memory:"
// gets its own database, so the pool must never open a second one.
async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::bootstrap_schema(&pool).await.expect("schema");
    pool
}

fn sample_record(code: &str) -> Medicine {
    let mut medicine = medscan::db::seed::sample_medicines().remove(0);
    medicine.code = code.to_string();
    medicine
}

#[tokio::test]
async fn unknown_code_yields_not_found_and_one_event() {
    let pool = test_pool().await;

    let verification = services::verify(&pool, "ZZZ000000").await.unwrap();
    assert_eq!(
        verification,
        Verification::NotFound {
            code: "ZZZ000000".to_string()
        }
    );

    let events = scans::recent(&pool, None).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].medicine_code, "ZZZ000000");
    assert_eq!(events[0].status, ScanStatus::NotFound);
    assert_eq!(events[0].medicine_name, None);
}

#[tokio::test]
async fn known_code_yields_record_and_matching_event() {
    let pool = test_pool().await;
    seed_database(&pool).await.unwrap();

    let verification = services::verify(&pool, "MED005678").await.unwrap();
    match &verification {
        Verification::Found { medicine } => {
            assert_eq!(medicine.status, MedicineStatus::Expired);
            assert_eq!(medicine.name, "Amoxicillin 250mg");
        }
        other => panic!("expected found, got {:?}", other),
    }

    let events = scans::recent(&pool, None).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, ScanStatus::Expired);
    assert_eq!(events[0].medicine_name.as_deref(), Some("Amoxicillin 250mg"));
}

#[tokio::test]
async fn codes_match_case_insensitively() {
    let pool = test_pool().await;
    seed_database(&pool).await.unwrap();

    let verification = services::verify(&pool, "  med001234 ").await.unwrap();
    assert!(matches!(verification, Verification::Found { .. }));

    // The event records the normalized code.
    let events = scans::recent(&pool, None).await.unwrap();
    assert_eq!(events[0].medicine_code, "MED001234");
}

#[tokio::test]
async fn blank_input_is_rejected_before_any_store_call() {
    let pool = test_pool().await;

    let result = services::verify(&pool, "   ").await;
    assert!(matches!(result, Err(VerifyError::EmptyCode)));
    assert_eq!(scans::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn seeding_twice_never_duplicates_records() {
    let pool = test_pool().await;

    assert_eq!(seed_database(&pool).await.unwrap(), SeedOutcome::Seeded(5));
    assert_eq!(
        seed_database(&pool).await.unwrap(),
        SeedOutcome::AlreadySeeded
    );
    assert_eq!(medicines::count(&pool).await.unwrap(), 5);
}

#[tokio::test]
async fn duplicate_code_insert_is_rejected() {
    let pool = test_pool().await;

    let medicine = sample_record("MED777777");
    medicines::insert(&pool, &medicine).await.unwrap();

    let result = medicines::insert(&pool, &medicine).await;
    match result {
        Err(StoreError::DuplicateCode { code }) => assert_eq!(code, "MED777777"),
        other => panic!("expected duplicate-code error, got {:?}", other),
    }
    assert_eq!(medicines::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn warnings_survive_the_round_trip() {
    let pool = test_pool().await;
    seed_database(&pool).await.unwrap();

    let counterfeit = medicines::get_by_code(&pool, "MED009999")
        .await
        .unwrap()
        .expect("seeded record");
    assert_eq!(counterfeit.warnings.len(), 3);
    assert_eq!(counterfeit.warnings[0], "COUNTERFEIT DETECTED");

    let legal = medicines::get_by_code(&pool, "MED001234")
        .await
        .unwrap()
        .expect("seeded record");
    assert!(legal.warnings.is_empty());
}

#[tokio::test]
async fn stats_agree_with_the_listing() {
    let pool = test_pool().await;
    seed_database(&pool).await.unwrap();

    let stats = services::get_stats(&pool).await.unwrap();
    let listed = medicines::list(&pool).await.unwrap();

    assert_eq!(stats.total_medicines as usize, listed.len());
    assert_eq!(
        stats.legal_products as usize,
        listed
            .iter()
            .filter(|m| m.status == MedicineStatus::Legal)
            .count()
    );
}

#[tokio::test]
async fn fixed_scenario_matches_expected_counts() {
    let pool = test_pool().await;
    seed_database(&pool).await.unwrap();

    let first = services::verify(&pool, "MED001234").await.unwrap();
    match &first {
        Verification::Found { medicine } => assert_eq!(medicine.status, MedicineStatus::Legal),
        other => panic!("expected found, got {:?}", other),
    }

    let second = services::verify(&pool, "MED005678").await.unwrap();
    assert_eq!(second.scan_status(), ScanStatus::Expired);

    let third = services::verify(&pool, "MED009999").await.unwrap();
    match &third {
        Verification::Found { medicine } => {
            assert_eq!(medicine.status, MedicineStatus::Counterfeit);
            assert!(!medicine.warnings.is_empty());
        }
        other => panic!("expected found, got {:?}", other),
    }

    let fourth = services::verify(&pool, "ZZZ000000").await.unwrap();
    assert_eq!(fourth.scan_status(), ScanStatus::NotFound);

    let stats = services::get_stats(&pool).await.unwrap();
    assert_eq!(stats.total_medicines, 5);
    assert_eq!(stats.total_scans, 4);
    assert_eq!(stats.legal_products, 2);
}

#[tokio::test]
async fn recent_is_newest_first_and_bounded() {
    let pool = test_pool().await;

    for i in 0..12 {
        scans::append(&pool, &format!("CODE{:03}", i), ScanStatus::NotFound, None)
            .await
            .unwrap();
    }

    // Default limit is 10.
    let events = scans::recent(&pool, None).await.unwrap();
    assert_eq!(events.len(), 10);
    assert_eq!(events[0].medicine_code, "CODE011");

    let events = scans::recent(&pool, Some(3)).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].medicine_code, "CODE011");
    assert_eq!(events[2].medicine_code, "CODE009");

    for pair in events.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }
}

#[tokio::test]
async fn breakdown_counts_events_per_status() {
    let pool = test_pool().await;
    seed_database(&pool).await.unwrap();

    services::verify(&pool, "MED001234").await.unwrap();
    services::verify(&pool, "MED003579").await.unwrap();
    services::verify(&pool, "ZZZ000000").await.unwrap();

    let breakdown = scans::breakdown(&pool).await.unwrap();
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0], (ScanStatus::Legal, 2));
    assert_eq!(breakdown[1], (ScanStatus::NotFound, 1));
}

#[tokio::test]
async fn every_verify_appends_even_for_repeated_codes() {
    let pool = test_pool().await;
    seed_database(&pool).await.unwrap();

    for _ in 0..3 {
        services::verify(&pool, "MED001234").await.unwrap();
    }
    assert_eq!(scans::count(&pool).await.unwrap(), 3);
}
