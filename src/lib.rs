//! Cashmachine - a personal cash machine simulator
//!
//! A Telegram bot for the operator and a small HTTP game API, both working
//! on one SQLite ledger.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, metrics and retry helpers
//! - `game`: Modes, outcomes, the payout engine and rig flags
//! - `storage`: Connection pool, migrations and ledger operations
//! - `payments`: Paystack checkout initialization
//! - `telegram`: Bot commands, dispatcher schema and notifications
//! - `api`: axum routes for `/bet`, `/deposit` and `/withdraw`

pub mod api;
pub mod cli;
pub mod core;
pub mod game;
pub mod payments;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
