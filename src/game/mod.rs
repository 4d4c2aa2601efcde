//! Minigame modes, outcomes and the payout engine

pub mod engine;
pub mod rig;

use std::fmt;
use std::str::FromStr;

use crate::core::error::AppError;

pub use engine::{bonus_amount, settle, Bonus, OutcomeRng, Settlement, ThreadRng, Wager};
pub use rig::RigOverride;

/// Minigame variant selecting the payout formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Aviation,
    Tap,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Aviation => "aviation",
            Mode::Tap => "tap",
        }
    }

    /// Capitalized name used in operator notifications
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Aviation => "Aviation",
            Mode::Tap => "Tap",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aviation" => Ok(Mode::Aviation),
            "tap" => Ok(Mode::Tap),
            other => Err(AppError::InvalidMode(other.to_string())),
        }
    }
}

// rusqlite FromSql: read mode from DB text column
impl rusqlite::types::FromSql for Mode {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        let s = value.as_str()?;
        Mode::from_str(s).map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
    }
}

// rusqlite ToSql: write mode as text to DB
impl rusqlite::types::ToSql for Mode {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(rusqlite::types::ToSqlOutput::Borrowed(rusqlite::types::ValueRef::Text(
            self.as_str().as_bytes(),
        )))
    }
}

/// Result of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
