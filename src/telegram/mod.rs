//! Telegram bot integration and handlers

pub mod admin;
pub mod bot;
pub mod commands;
pub mod handlers;
pub mod notifications;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use commands::{execute, CommandContext, CommandReply};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use notifications::{LogNotifier, Notifier, TelegramNotifier};
