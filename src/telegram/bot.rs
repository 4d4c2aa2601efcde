//! Bot initialization and command definitions
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
///
/// Argument-taking commands keep the raw text so malformed input can be
/// answered with a usage hint instead of being dropped by the parser.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Cash machine commands:")]
pub enum Command {
    #[command(description = "open the cash machine")]
    Start,
    #[command(description = "switch game mode: /mode aviation|tap")]
    Mode(String),
    #[command(description = "get a deposit link: /deposit <amount>")]
    Deposit(String),
    #[command(description = "show balance and mode")]
    Balance,
    #[command(description = "rig the next aviation bet: /riggame win|lose")]
    RigGame(String),
    #[command(description = "rig the next tap conversion: /rigtap boost")]
    RigTap(String),
    #[command(description = "total system profits")]
    Profits,
    #[command(description = "credit a random hack bonus")]
    HackCash,
    #[command(description = "credit a random fling bonus")]
    Fling,
    #[command(description = "last 10 bets")]
    History,
}

impl Command {
    /// Lowercase command name, used as a metrics label
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Mode(_) => "mode",
            Command::Deposit(_) => "deposit",
            Command::Balance => "balance",
            Command::RigGame(_) => "riggame",
            Command::RigTap(_) => "rigtap",
            Command::Profits => "profits",
            Command::HackCash => "hackcash",
            Command::Fling => "fling",
            Command::History => "history",
        }
    }
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token or invalid `BOT_API_URL`
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("TELEGRAM_BOT_TOKEN is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// # Arguments
/// * `bot` - Bot instance to configure
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Option<Command> {
        Command::parse(text, "cashmachine_bot").ok()
    }

    #[test]
    fn test_command_descriptions() {
        let command_list = format!("{}", Command::descriptions());

        assert!(command_list.contains("Cash machine commands"));
        assert!(command_list.contains("/riggame"));
        assert!(command_list.contains("/hackcash"));
        assert!(command_list.contains("/history"));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(parse("/mode tap"), Some(Command::Mode("tap".to_string())));
        assert_eq!(parse("/deposit 25.5"), Some(Command::Deposit("25.5".to_string())));
        assert_eq!(parse("/riggame win"), Some(Command::RigGame("win".to_string())));
        assert_eq!(parse("/rigtap boost"), Some(Command::RigTap("boost".to_string())));
    }

    #[test]
    fn test_parse_commands_without_arguments() {
        assert_eq!(parse("/start"), Some(Command::Start));
        assert_eq!(parse("/fling"), Some(Command::Fling));
        assert_eq!(parse("/unknown"), None);
    }

    #[test]
    fn test_command_names_match_menu() {
        let menu: Vec<String> = Command::bot_commands().into_iter().map(|c| c.command).collect();
        assert!(menu.iter().any(|c| c.ends_with("rigtap")));
        assert_eq!(Command::HackCash.name(), "hackcash");
    }
}
