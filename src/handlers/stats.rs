use sqlx::SqlitePool;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::db::scans;
use crate::handlers::verify::status_badge;
use crate::services;
use crate::utils::escape_markdown;

/// Sends the aggregate verification counts.
pub async fn show_stats(bot: Bot, msg: Message, pool: SqlitePool) -> Result<(), crate::Error> {
    log::info!("Showing verification stats");
    let stats = services::get_stats(&pool).await?;

    let message = format!(
        "📊 *Verification Stats*\n\n\
         Total medicines: {}\n\
         Total scans: {}\n\
         Legal products: {}",
        stats.total_medicines, stats.total_scans, stats.legal_products,
    );

    bot.send_message(msg.chat.id, message)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    Ok(())
}

/// Sends the trailing scan history, newest first (default 10 entries).
pub async fn show_recent(bot: Bot, msg: Message, pool: SqlitePool) -> Result<(), crate::Error> {
    log::info!("Showing recent scans");
    let events = scans::recent(&pool, None).await?;

    if events.is_empty() {
        bot.send_message(msg.chat.id, "No scans yet").await?;
        return Ok(());
    }

    let entries = events
        .iter()
        .map(|event| {
            format!(
                "{}\n`{}` {}\n{}",
                status_badge(event.status),
                event.medicine_code,
                escape_markdown(event.medicine_name.as_deref().unwrap_or("Unknown")),
                escape_markdown(&event.timestamp.format("%d %b %Y %H:%M UTC").to_string()),
            )
        })
        .collect::<Vec<String>>()
        .join("\n\n");

    let message = format!("🕘 *Recent Scans*\n\n{}", entries);

    bot.send_message(msg.chat.id, message)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    Ok(())
}
