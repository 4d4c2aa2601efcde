//! SQLite persistence: pool, schema and balance operations

pub mod db;
pub mod ledger;
pub mod migrations;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use ledger::BetReceipt;
