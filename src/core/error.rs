use thiserror::Error;

/// Centralized error types for the application
///
/// Both the bot and the HTTP API funnel failures through this enum. The API
/// layer maps the client-side variants (`Validation`, `InvalidMode`,
/// `InsufficientBalance`) to 400 and everything else to 500.
///
/// # Example
///
/// ```no_run
/// use cashmachine::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(String),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Payment provider rejected or returned an unusable response
    #[error("Payment error: {0}")]
    Payment(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("{0}")]
    Validation(String),

    /// Unknown game mode
    #[error("Invalid mode")]
    InvalidMode(String),

    /// Stake or withdrawal exceeds the current balance
    #[error("Insufficient balance")]
    InsufficientBalance { balance: f64, requested: f64 },
}

impl AppError {
    /// Returns true for errors caused by the caller's input rather than the
    /// service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::InvalidMode(_) | AppError::InsufficientBalance { .. }
        )
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
