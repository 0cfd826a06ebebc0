use sqlx::SqlitePool;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::time::sleep;

use crate::db::models::{Medicine, ScanStatus};
use crate::services::{self, Verification, VerifyError};
use crate::utils::{escape_markdown, format_date};
use crate::workflow::{code_digest, ScanWorkflow, SCAN_FEEDBACK_DELAY};

/// Runs one verification round trip for the given input and renders the
/// outcome back to the chat.
///
/// Drives a [`ScanWorkflow`] through its full cycle: the input is validated
/// and normalized, a scanning indicator is shown for the fixed feedback
/// delay, then the verification service is invoked and the terminal state is
/// rendered. A failed event-log append still shows the classification, with a
/// notice that the scan was not recorded.
pub async fn verify_code(
    bot: Bot,
    msg: Message,
    pool: SqlitePool,
    raw_code: &str,
) -> Result<(), crate::Error> {
    let mut workflow = ScanWorkflow::new();
    let code = match workflow.submit(raw_code) {
        Ok(code) => code,
        Err(e) => {
            bot.send_message(msg.chat.id, e.to_string()).await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, format!("🔍 Scanning {}...", code))
        .await?;
    // Fixed delay so the scan feels deliberate; the lookup itself is instant.
    sleep(SCAN_FEEDBACK_DELAY).await;

    match services::verify(&pool, &code).await {
        Ok(verification) => {
            workflow.complete(&verification)?;
            bot.send_message(msg.chat.id, render_verification(&verification, &code))
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        Err(VerifyError::Log {
            source,
            verification,
        }) => {
            // Best-effort telemetry: the classification stands even though the
            // scan history entry was lost.
            log::error!("Failed to record scan of {}: {}", code, source);
            workflow.complete(&verification)?;
            let mut reply = render_verification(&verification, &code);
            reply.push_str("\n\n⚠️ This scan could not be added to the history\\.");
            bot.send_message(msg.chat.id, reply)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        Err(e) => {
            log::error!("Verification failed for {}: {}", code, e);
            bot.send_message(msg.chat.id, "Verification failed. Please try again later.")
                .await?;
        }
    }

    workflow.reset();
    Ok(())
}

fn render_verification(verification: &Verification, code: &str) -> String {
    let mut message = match verification {
        Verification::Found { medicine } => render_medicine(medicine),
        Verification::NotFound { code } => format!(
            "❌ *NOT FOUND*\n\n`{}` is not in the reference database\\.",
            code
        ),
    };

    if let Some(digest) = code_digest(code) {
        message.push_str(&format!("\n\nSHA\\-256: `{}`", digest));
    }
    message
}

fn render_medicine(medicine: &Medicine) -> String {
    let mut message = format!(
        "{}\n*{}*\n\n\
         Manufacturer: {}\n\
         Batch No: `{}`\n\
         Mfg Date: `{}`\n\
         Exp Date: `{}`\n\
         License: `{}`\n\
         Country: {}\n\
         Composition: {}",
        status_badge(medicine.status.into()),
        escape_markdown(&medicine.name),
        escape_markdown(&medicine.manufacturer),
        medicine.batch_no,
        format_date(medicine.mfg_date),
        format_date(medicine.exp_date),
        medicine.license_no,
        escape_markdown(&medicine.country),
        escape_markdown(&medicine.composition),
    );

    if !medicine.warnings.is_empty() {
        message.push_str("\n\n⚠️ *Warnings:*");
        for warning in &medicine.warnings {
            message.push_str(&format!("\n• {}", escape_markdown(warning)));
        }
    }
    message
}

pub fn status_badge(status: ScanStatus) -> &'static str {
    match status {
        ScanStatus::Legal => "✅ *LEGAL*",
        ScanStatus::Expired => "⏰ *EXPIRED*",
        ScanStatus::Counterfeit => "🚫 *COUNTERFEIT*",
        ScanStatus::Recalled => "⚠️ *RECALLED*",
        ScanStatus::NotFound => "❌ *NOT FOUND*",
    }
}
