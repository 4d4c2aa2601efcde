use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use cashmachine::api::{self, ApiState};
use cashmachine::cli::{Cli, Commands};
use cashmachine::core::{config, init_logger, log_startup_configuration, metrics, GameConfig};
use cashmachine::payments::PaystackClient;
use cashmachine::storage::{create_pool, DbPool};
use cashmachine::telegram::{
    create_bot, schema, setup_bot_commands, CommandContext, HandlerDeps, LogNotifier, Notifier, TelegramNotifier,
};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the bot, the API or both.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from the dispatcher task instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load .env before any config static is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;
    metrics::init_metrics();

    match cli.command {
        Some(Commands::InitDb { database }) => {
            let path = database.unwrap_or_else(|| config::DATABASE_PATH.clone());
            create_pool(&path).map_err(|e| anyhow::anyhow!("Failed to initialize database {}: {}", path, e))?;
            log::info!("Database ready at {}", path);
            Ok(())
        }
        Some(Commands::Bot) => {
            let game = GameConfig::from_env();
            log_startup_configuration(&game);
            let db_pool = open_pool()?;
            let bot = create_bot()?;
            run_bot(bot, db_pool).await
        }
        Some(Commands::Api { port }) => {
            let game = GameConfig::from_env();
            log_startup_configuration(&game);
            let db_pool = open_pool()?;
            let notifier = build_notifier();
            run_api(db_pool, game, notifier, port).await
        }
        Some(Commands::Run { port }) => run_all(port).await,
        None => {
            log::info!("No command specified, running bot and API");
            run_all(None).await
        }
    }
}

fn open_pool() -> Result<Arc<DbPool>> {
    let pool = create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    Ok(Arc::new(pool))
}

/// Telegram notifier when a token is configured, log-only otherwise
fn build_notifier() -> Arc<dyn Notifier> {
    match create_bot() {
        Ok(bot) => Arc::new(TelegramNotifier::for_admin(bot)),
        Err(e) => {
            log::warn!("Operator notifications disabled: {}", e);
            Arc::new(LogNotifier)
        }
    }
}

/// Runs the bot and the API together until either stops. Without a bot
/// token only the API runs.
async fn run_all(port: Option<u16>) -> Result<()> {
    let game = GameConfig::from_env();
    log_startup_configuration(&game);

    let db_pool = open_pool()?;
    let bot = match create_bot() {
        Ok(bot) => bot,
        Err(e) => {
            log::warn!("Bot disabled ({}), running API only", e);
            return run_api(db_pool, game, Arc::new(LogNotifier), port).await;
        }
    };
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::for_admin(bot.clone()));

    tokio::select! {
        res = run_bot(bot, Arc::clone(&db_pool)) => res,
        res = run_api(db_pool, game, notifier, port) => res,
    }
}

async fn run_api(db_pool: Arc<DbPool>, game: GameConfig, notifier: Arc<dyn Notifier>, port: Option<u16>) -> Result<()> {
    let payments = Arc::new(PaystackClient::from_env()?);
    let state = ApiState::new(db_pool, game, notifier, payments);
    let static_dir = config::api::STATIC_DIR.as_str();
    let static_dir = std::path::Path::new(static_dir).is_dir().then_some(static_dir);
    if static_dir.is_none() {
        log::warn!("Static directory {} not found, /static is disabled", config::api::STATIC_DIR.as_str());
    }

    api::serve(state, &config::api::HOST, port.unwrap_or(*config::api::PORT), static_dir).await
}

/// Runs the long-polling dispatcher, restarting it after a panic.
async fn run_bot(bot: Bot, db_pool: Arc<DbPool>) -> Result<()> {
    log::info!("Starting bot...");

    let me = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", me.username, me.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let context = CommandContext {
        admin_id: *config::admin::ADMIN_USER_ID,
        public_url: config::PUBLIC_URL.clone(),
    };
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::for_admin(bot.clone()));
    let handler = schema(HandlerDeps::new(db_pool, context, notifier));

    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;
    let mut retry_count = 0;

    log::info!("Starting bot in long polling mode");

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Run the dispatcher in its own task so a panic surfaces as a JoinError
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if retry_count >= max_retries {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
                retry_count += 1;
                log::info!(
                    "Restarting dispatcher after panic (attempt {}/{})...",
                    retry_count,
                    max_retries
                );
                sleep(backoff(retry_count)).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }

        sleep(config::retry::dispatcher_delay()).await;
    }

    Ok(())
}

/// 2, 4, 8 ... seconds, capped at one minute
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt).min(60))
}
