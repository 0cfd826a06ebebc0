use sqlx::SqlitePool;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::db::models::{Medicine, ScanStatus, VerificationStats};
use crate::db::{medicines, scans, StoreError};
use crate::utils::normalize_code;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Medicine code must not be empty")]
    EmptyCode,
    #[error("Lookup failed: {0}")]
    Lookup(#[source] StoreError),
    /// The classification succeeded but the scan event could not be recorded.
    /// The carried verification lets callers still show the result.
    #[error("Failed to record scan event: {source}")]
    Log {
        #[source]
        source: StoreError,
        verification: Verification,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Found { medicine: Medicine },
    NotFound { code: String },
}

impl Verification {
    pub fn scan_status(&self) -> ScanStatus {
        match self {
            Verification::Found { medicine } => ScanStatus::from(medicine.status),
            Verification::NotFound { .. } => ScanStatus::NotFound,
        }
    }
}

/// Resolves a code against the reference store, classifies the outcome, and
/// appends exactly one scan event. Every call appends; repeated scans of the
/// same code are not deduplicated.
pub async fn verify(pool: &SqlitePool, raw_code: &str) -> Result<Verification, VerifyError> {
    let code = normalize_code(raw_code);
    if code.is_empty() {
        return Err(VerifyError::EmptyCode);
    }

    let found = medicines::get_by_code(pool, &code)
        .await
        .map_err(VerifyError::Lookup)?;
    let verification = match found {
        Some(medicine) => Verification::Found { medicine },
        None => Verification::NotFound { code: code.clone() },
    };

    let status = verification.scan_status();
    let name = match &verification {
        Verification::Found { medicine } => Some(medicine.name.as_str()),
        Verification::NotFound { .. } => None,
    };
    if let Err(source) = scans::append(pool, &code, status, name).await {
        return Err(VerifyError::Log {
            source,
            verification,
        });
    }

    log::info!("Verified code {}: {}", code, status);
    Ok(verification)
}

/// Three uncombined counts over both stores, recomputed on every call. The
/// tables are small and this only backs dashboard views, so no caching.
pub async fn get_stats(pool: &SqlitePool) -> Result<VerificationStats, StoreError> {
    let (total_medicines, total_scans, legal_products) = futures::try_join!(
        medicines::count(pool),
        scans::count(pool),
        medicines::legal_count(pool),
    )?;
    Ok(VerificationStats {
        total_medicines,
        total_scans,
        legal_products,
    })
}

/// Schedules the daily verification digest for the configured chat.
///
/// Runs every day at 8:00 AM, posting the aggregate stats and the per-status
/// scan breakdown. Errors inside the job are logged, never fatal.
pub async fn schedule_digest(
    pool: SqlitePool,
    bot: Bot,
    digest_chat_id: ChatId,
) -> Result<(), crate::Error> {
    let sched = JobScheduler::new().await?;

    let job = Job::new_async("0 0 8 * * *", move |_uuid, _l| {
        let bot = bot.clone();
        let pool = pool.clone();
        let chat_id = digest_chat_id;
        Box::pin(async move {
            match send_digest(&pool, &bot, chat_id).await {
                Ok(_) => log::info!("Verification digest sent"),
                Err(e) => log::error!("Error sending verification digest: {}", e),
            }
        })
    })
    .map_err(|e| {
        log::error!("Failed to create digest job: {}", e);
        Box::new(e) as crate::Error
    })?;

    sched.add(job).await.map_err(|e| {
        log::error!("Failed to add digest job to scheduler: {}", e);
        Box::new(e) as crate::Error
    })?;

    tokio::spawn(async move {
        if let Err(e) = sched.start().await {
            log::error!("Scheduler error: {}", e);
        }
    });

    log::info!("Digest scheduler started successfully");
    Ok(())
}

async fn send_digest(pool: &SqlitePool, bot: &Bot, chat_id: ChatId) -> Result<(), crate::Error> {
    let stats = get_stats(pool).await?;
    let breakdown = scans::breakdown(pool).await?;

    bot.send_message(chat_id, format_digest(&stats, &breakdown))
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    Ok(())
}

fn format_digest(stats: &VerificationStats, breakdown: &[(ScanStatus, i64)]) -> String {
    let mut message = format!(
        "📊 *Daily Verification Digest*\n\n\
         Total medicines: {}\n\
         Total scans: {}\n\
         Legal products: {}",
        stats.total_medicines, stats.total_scans, stats.legal_products,
    );

    if !breakdown.is_empty() {
        message.push_str("\n\n*Scans by outcome:*");
        for (status, count) in breakdown {
            message.push_str(&format!(
                "\n• {}: {}",
                status.as_str().replace('_', " "),
                count
            ));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lists_every_breakdown_row() {
        let stats = VerificationStats {
            total_medicines: 5,
            total_scans: 4,
            legal_products: 2,
        };
        let breakdown = vec![(ScanStatus::Legal, 3), (ScanStatus::NotFound, 1)];
        let message = format_digest(&stats, &breakdown);
        assert!(message.contains("Total scans: 4"));
        assert!(message.contains("• legal: 3"));
        assert!(message.contains("• not found: 1"));
    }

    #[test]
    fn digest_omits_the_breakdown_when_empty() {
        let stats = VerificationStats {
            total_medicines: 0,
            total_scans: 0,
            legal_products: 0,
        };
        let message = format_digest(&stats, &[]);
        assert!(!message.contains("Scans by outcome"));
    }
}
