use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Parses a probability-like rate and clamps it into `[0, 1]`.
pub fn parse_rate(raw: Option<&str>, default: f64) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
        .clamp(0.0, 1.0)
}

/// Bot token
/// Read from TELEGRAM_BOT_TOKEN, BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("TELEGRAM_BOT_TOKEN")
        .or_else(|_| env::var("BOT_TOKEN"))
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: solo_cashmachine.db
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "solo_cashmachine.db".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: cashmachine.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "cashmachine.log".to_string()));

/// Public URL the bot advertises for playing and depositing
/// Read from PUBLIC_URL environment variable
pub static PUBLIC_URL: Lazy<String> = Lazy::new(|| {
    env::var("PUBLIC_URL")
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "http://localhost:8000".to_string())
});

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    /// Default operator account when ADMIN_USER_ID is not set
    pub const DEFAULT_ADMIN_USER_ID: i64 = 7_751_724_771;

    /// The only Telegram user allowed to drive the machine
    /// Read from ADMIN_USER_ID environment variable
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_USER_ID")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_ADMIN_USER_ID)
    });
}

/// Game tuning
pub mod game {
    use once_cell::sync::Lazy;
    use std::env;

    pub const DEFAULT_HOUSE_EDGE: f64 = 0.1;
    pub const DEFAULT_WIN_RATE: f64 = 0.8;
    pub const DEFAULT_TAP_PAYOUT_RATE: f64 = 0.9;

    /// Fraction of the payout kept by the house
    /// Read from HOUSE_EDGE environment variable
    pub static HOUSE_EDGE: Lazy<f64> =
        Lazy::new(|| super::parse_rate(env::var("HOUSE_EDGE").ok().as_deref(), DEFAULT_HOUSE_EDGE));

    /// Probability that an aviation round is a win
    /// Read from WIN_RATE environment variable
    pub static WIN_RATE: Lazy<f64> =
        Lazy::new(|| super::parse_rate(env::var("WIN_RATE").ok().as_deref(), DEFAULT_WIN_RATE));

    /// Share of a tap stake paid back to the player
    /// Read from TAP_PAYOUT_RATE environment variable
    pub static TAP_PAYOUT_RATE: Lazy<f64> = Lazy::new(|| {
        super::parse_rate(
            env::var("TAP_PAYOUT_RATE").ok().as_deref(),
            DEFAULT_TAP_PAYOUT_RATE,
        )
    });
}

/// HTTP API configuration
pub mod api {
    use once_cell::sync::Lazy;
    use std::env;

    /// Bind host
    /// Read from API_HOST environment variable
    pub static HOST: Lazy<String> = Lazy::new(|| env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()));

    /// Bind port
    /// Read from API_PORT (or PORT) environment variable
    /// Default: 8000
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("API_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000)
    });

    /// Directory served under /static
    pub static STATIC_DIR: Lazy<String> =
        Lazy::new(|| env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));
}

/// Paystack configuration
pub mod paystack {
    use once_cell::sync::Lazy;
    use std::env;

    /// Secret key sent as a bearer token
    /// Read from PAYSTACK_SECRET_KEY environment variable
    pub static SECRET_KEY: Lazy<String> = Lazy::new(|| env::var("PAYSTACK_SECRET_KEY").unwrap_or_default());

    /// Paystack API root
    /// Read from PAYSTACK_BASE_URL environment variable
    pub static BASE_URL: Lazy<String> = Lazy::new(|| {
        env::var("PAYSTACK_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "https://api.paystack.co".to_string())
    });
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Total attempts for operator notifications and payment initialization
    pub const ATTEMPTS: u32 = 3;

    /// Pause between attempts (in seconds)
    pub const RETRY_DELAY_SECS: u64 = 2;

    /// Retry delay duration
    pub fn delay() -> Duration {
        Duration::from_secs(RETRY_DELAY_SECS)
    }

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for outbound HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Payout parameters handed to the game engine.
///
/// Built from the environment at startup; tests construct it directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub house_edge: f64,
    pub win_rate: f64,
    pub tap_payout_rate: f64,
}

impl GameConfig {
    pub fn from_env() -> Self {
        Self {
            house_edge: *game::HOUSE_EDGE,
            win_rate: *game::WIN_RATE,
            tap_payout_rate: *game::TAP_PAYOUT_RATE,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            house_edge: game::DEFAULT_HOUSE_EDGE,
            win_rate: game::DEFAULT_WIN_RATE,
            tap_payout_rate: game::DEFAULT_TAP_PAYOUT_RATE,
        }
    }
}
