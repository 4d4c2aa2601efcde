//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A configuration summary printed once at startup

use anyhow::Result;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::OpenOptions;

use crate::core::config::{self, GameConfig};

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file (appended to, created if missing)
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup.
///
/// Secrets are never printed, only whether they are present.
pub fn log_startup_configuration(game: &GameConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("💰 Cash Machine Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Admin user id:    {}", *config::admin::ADMIN_USER_ID);
    log::info!("Database:         {}", config::DATABASE_PATH.as_str());
    log::info!("Public URL:       {}", config::PUBLIC_URL.as_str());
    log::info!("House edge:       {:.3}", game.house_edge);
    log::info!("Win rate:         {:.3}", game.win_rate);
    log::info!("Tap payout rate:  {:.3}", game.tap_payout_rate);

    if config::BOT_TOKEN.is_empty() {
        log::warn!("⚠️  TELEGRAM_BOT_TOKEN: not set (bot and notifications will fail)");
    } else {
        log::info!("✅ TELEGRAM_BOT_TOKEN: set");
    }

    if config::paystack::SECRET_KEY.is_empty() {
        log::warn!("⚠️  PAYSTACK_SECRET_KEY: not set (deposits will be rejected by Paystack)");
    } else {
        log::info!("✅ PAYSTACK_SECRET_KEY: set");
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
