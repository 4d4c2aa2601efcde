//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::storage::db::DbPool;
use crate::telegram::commands::CommandContext;
use crate::telegram::notifications::Notifier;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub context: Arc<CommandContext>,
    pub notifier: Arc<dyn Notifier>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, context: CommandContext, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db_pool,
            context: Arc::new(context),
            notifier,
        }
    }
}

/// Telegram id of the message author, if it fits in an `i64`
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok())
}
