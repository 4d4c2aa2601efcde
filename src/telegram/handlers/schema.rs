//! Dispatcher schema

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::core::metrics;
use crate::game::ThreadRng;
use crate::telegram::bot::Command;
use crate::telegram::commands::execute;

/// Creates the dispatcher schema for the Telegram bot.
///
/// Only messages that parse as a [`Command`] are handled; everything else
/// is ignored.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move { handle_command(bot, msg, cmd, deps).await }
        },
    ))
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command, deps: HandlerDeps) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(&msg) else {
        log::debug!("Ignoring /{} without a sender in chat {}", cmd.name(), msg.chat.id);
        return Ok(());
    };

    log::info!("Received command: {:?} from user {}", cmd, user_id);
    metrics::COMMANDS_TOTAL.with_label_values(&[cmd.name()]).inc();

    let reply = match execute(&deps.db_pool, &deps.context, user_id, &cmd, &mut ThreadRng) {
        Ok(reply) => reply,
        Err(e) => {
            log::error!("/{} failed for user {}: {}", cmd.name(), user_id, e);
            bot.send_message(msg.chat.id, "Something went wrong, please try again.")
                .await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, reply.text).await?;

    if let Some(text) = reply.direct_message {
        deps.notifier.notify(&text).await;
    }

    Ok(())
}
