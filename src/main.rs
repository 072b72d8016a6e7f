//! Carry loyalty bot
//!
//! Main application entry point

use std::sync::Arc;
use anyhow::Context;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use carry_bot::{
    config::{Settings, StateBackend},
    database::{create_pool, run_migrations, PgStorage},
    handlers::{DialogSettings, HandlerDeps},
    i18n::I18n,
    middleware::{AuthMiddleware, LoggingMiddleware},
    services::QrCodeEncoder,
    state::{ConversationEngine, MemoryStateStorage, RedisStateStorage, StateStorage},
    telegram::{self, Command, TelegramDelivery},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", carry_bot::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;
    run_migrations(&pool).await?;
    let storage = Arc::new(PgStorage::new(pool));

    // Initialize state management
    let states: Arc<dyn StateStorage> = match settings.state.backend {
        StateBackend::Memory => {
            info!("Using in-memory conversation state");
            Arc::new(MemoryStateStorage::new())
        }
        StateBackend::Redis => {
            info!("Connecting to Redis...");
            Arc::new(RedisStateStorage::new(&settings.state).await?)
        }
    };

    // Load message templates
    info!("Loading templates...");
    let templates = I18n::load(&settings.templates).await?;

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);
    let bot_username = match settings.bot.bot_username.clone() {
        Some(username) => username.trim_start_matches('@').to_string(),
        None => {
            let me = bot.get_me().await.context("failed to fetch bot profile")?;
            me.username().to_string()
        }
    };
    info!(bot_username = %bot_username, "Bot identity resolved");

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let deps = HandlerDeps {
        templates: Arc::new(templates),
        encoder: Arc::new(QrCodeEncoder::default()),
        settings: DialogSettings {
            bot_username,
            list_page_size: settings.conversation.list_page_size,
            links: settings.links.clone(),
        },
    };
    let dialog_ttl = settings
        .conversation
        .dialog_ttl_seconds
        .and_then(|seconds| chrono::Duration::try_seconds(seconds as i64));

    let engine = ConversationEngine::new(
        storage,
        states,
        deps,
        AuthMiddleware::from_config(&settings.bot),
    )
    .with_dialog_ttl(dialog_ttl)
    .with_logging(LoggingMiddleware::new(
        settings.logging.log_events,
        settings.logging.log_performance,
    ));
    info!(admins = engine.auth().admin_count(), "Conversation engine ready");

    let delivery = TelegramDelivery::new(bot.clone());

    let mut dispatcher = Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![Arc::new(engine), Arc::new(delivery)])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    info!("Bot has been shut down.");
    Ok(())
}
