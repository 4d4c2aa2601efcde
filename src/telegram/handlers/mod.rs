//! Telegram bot handler tree configuration
//!
//! The same schema is used by the polling dispatcher in production and can be
//! driven directly in tests.

mod schema;
mod types;

pub use schema::schema;
pub use types::{sender_id, HandlerDeps, HandlerError};
