//! Append-only scan log. Events are never mutated or deleted.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{ScanEvent, ScanStatus};
use super::StoreError;

pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Appends one event with a server-assigned id and timestamp. Failures are
/// surfaced to the caller; nothing is retried here.
pub async fn append(
    pool: &SqlitePool,
    medicine_code: &str,
    status: ScanStatus,
    medicine_name: Option<&str>,
) -> Result<ScanEvent, StoreError> {
    let event = ScanEvent {
        id: Uuid::new_v4(),
        medicine_code: medicine_code.to_string(),
        status,
        medicine_name: medicine_name.map(str::to_string),
        timestamp: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO scans (id, medicine_code, status, medicine_name, timestamp) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(event.id)
    .bind(&event.medicine_code)
    .bind(event.status)
    .bind(&event.medicine_name)
    .bind(event.timestamp)
    .execute(pool)
    .await?;

    Ok(event)
}

/// Up to `limit` most recent events, newest first. Ties within the same
/// timestamp fall back to insertion order.
pub async fn recent(pool: &SqlitePool, limit: Option<i64>) -> Result<Vec<ScanEvent>, StoreError> {
    let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let events = sqlx::query_as::<_, ScanEvent>(
        "SELECT id, medicine_code, status, medicine_name, timestamp FROM scans \
         ORDER BY timestamp DESC, rowid DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

pub async fn count(pool: &SqlitePool) -> Result<i64, StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scans")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Event counts per classification, most frequent first. Feeds the digest.
pub async fn breakdown(pool: &SqlitePool) -> Result<Vec<(ScanStatus, i64)>, StoreError> {
    let rows = sqlx::query_as::<_, (ScanStatus, i64)>(
        "SELECT status, COUNT(*) FROM scans GROUP BY status ORDER BY COUNT(*) DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
