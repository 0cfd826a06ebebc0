use dotenvy::dotenv;
use dptree::case;
use envconfig::Envconfig;
use sqlx::SqlitePool;
use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        Dispatcher, UpdateFilterExt,
    },
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ReplyMarkup},
    utils::command::BotCommands,
};

use medscan::db::{self, seed};
use medscan::handlers::{stats, verify};
use medscan::services;
use medscan::Error;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "TELEGRAM_BOT_TOKEN")]
    telegram_bot_token: String,

    #[envconfig(from = "DATABASE_URL")]
    database_url: String,

    /// Chat that receives the daily verification digest. Digests are disabled
    /// when unset.
    #[envconfig(from = "DIGEST_CHAT_ID")]
    digest_chat_id: Option<i64>,
}

#[derive(BotCommands, Debug, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
enum Command {
    #[command(description = "Start interacting with the verification bot.")]
    Start,
    #[command(description = "Verify a medicine code.")]
    Verify(String),
    #[command(description = "Show verification statistics.")]
    Stats,
    #[command(description = "Show the most recent scans.")]
    Recent,
    #[command(description = "Load the sample medicine data.")]
    Seed,
    #[command(description = "Display the main menu.")]
    Menu,
    #[command(description = "Display help information about available commands.")]
    Help,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub enum State {
    #[default]
    Start,
    /// `/verify` was issued without a code; the next text message is the code.
    AwaitingCode,
}

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// Demo codes from the sample dataset, mapped to their expected outcome.
static QUICK_TEST_CODES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "MED001234" => "legal",
    "MED005678" => "expired",
    "MED009999" => "counterfeit",
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting the medicine verification bot...");

    // Load environment variables from a .env file if present
    dotenv().ok();

    let config = Config::init_from_env().unwrap();

    // Open the SQLite database and bootstrap the schema
    let pool = db::init_db(&config.database_url).await?;

    let bot = Bot::new(config.telegram_bot_token);

    if let Some(chat_id) = config.digest_chat_id {
        services::schedule_digest(pool.clone(), bot.clone(), ChatId(chat_id)).await?;
    }

    let handler = dialogue::enter::<Update, InMemStorage<State>, State, _>()
        // Handle command messages
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(answer)),
        )
        // Handle the code sent after a bare /verify
        .branch(Update::filter_message().branch(case![State::AwaitingCode].endpoint(receive_code)))
        // Handle all other messages
        .branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pool, InMemStorage::<State>::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Shutting down gracefully");
    Ok(())
}

/// Handles bot commands and responds accordingly.
async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    pool: SqlitePool,
    dialogue: MyDialogue,
) -> Result<(), Error> {
    match cmd {
        Command::Start => {
            log::info!("Received start command");
            bot.send_message(msg.chat.id, welcome_text()).await?;
        }
        Command::Verify(code) => {
            log::info!("Received verify command");
            if code.trim().is_empty() {
                bot.send_message(msg.chat.id, "Send the medicine code to verify:")
                    .await?;
                dialogue.update(State::AwaitingCode).await?;
            } else {
                verify::verify_code(bot, msg, pool, &code).await?;
            }
        }
        Command::Stats => {
            log::info!("Received stats command");
            stats::show_stats(bot, msg, pool).await?;
        }
        Command::Recent => {
            log::info!("Received recent command");
            stats::show_recent(bot, msg, pool).await?;
        }
        Command::Seed => {
            log::info!("Received seed command");
            let outcome = seed::seed_database(&pool).await?;
            bot.send_message(msg.chat.id, outcome.to_string()).await?;
        }
        Command::Menu => {
            log::info!("Received menu command");

            let keyboard = KeyboardMarkup::new(vec![
                vec![KeyboardButton::new("🔍 Verify Medicine")],
                vec![KeyboardButton::new("📊 Stats")],
                vec![KeyboardButton::new("🕘 Recent Scans")],
                vec![KeyboardButton::new("❓ Help")],
            ])
            .resize_keyboard()
            .one_time_keyboard();

            bot.send_message(
                msg.chat.id,
                "Welcome to the Medicine Scanner! Please choose an option:",
            )
            .reply_markup(ReplyMarkup::Keyboard(keyboard))
            .await?;
        }
        Command::Help => {
            log::info!("Received help command");
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
    };

    Ok(())
}

/// Receives the code sent after a bare `/verify` and runs the verification.
async fn receive_code(
    bot: Bot,
    msg: Message,
    pool: SqlitePool,
    dialogue: MyDialogue,
) -> Result<(), Error> {
    if let Some(text) = msg.text() {
        let code = text.to_string();
        dialogue.exit().await?;
        verify::verify_code(bot, msg, pool, &code).await?;
    } else {
        bot.send_message(msg.chat.id, "Please send the code as a text message.")
            .await?;
    }
    Ok(())
}

/// Handles menu-button presses and any other free-form messages.
async fn handle_message(
    bot: Bot,
    msg: Message,
    pool: SqlitePool,
    dialogue: MyDialogue,
) -> Result<(), Error> {
    if let Some(text) = msg.text() {
        match text {
            "🔍 Verify Medicine" => {
                bot.send_message(msg.chat.id, "Send the medicine code to verify:")
                    .await?;
                dialogue.update(State::AwaitingCode).await?;
            }
            "📊 Stats" => stats::show_stats(bot, msg, pool).await?,
            "🕘 Recent Scans" => stats::show_recent(bot, msg, pool).await?,
            "❓ Help" => {
                bot.send_message(msg.chat.id, Command::descriptions().to_string())
                    .await?;
            }
            _ => {
                bot.send_message(
                    msg.chat.id,
                    "I don't understand that. Use the menu or type /help for available commands.",
                )
                .await?;
            }
        }
    }
    Ok(())
}

fn welcome_text() -> String {
    let mut text = String::from(
        "Welcome to the Medicine Scanner!\n\n\
         Send /verify followed by a product code to check its authenticity.\n\n\
         Quick test codes:",
    );
    for (code, expected) in QUICK_TEST_CODES.entries() {
        text.push_str(&format!("\n• {} ({})", code, expected));
    }
    text
}
