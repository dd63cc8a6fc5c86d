//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::handle_command;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;

/// Creates the dispatcher schema for the bot.
///
/// Known commands are answered directly, any other `/command` is ignored and
/// remaining text messages are treated as links.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps))
}

fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);
            if let Err(e) = handle_command(&bot, msg.chat.id, cmd).await {
                log::error!("❌ Failed to answer command in chat {}: {}", msg.chat.id, e);
            }
            Ok(())
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_map(|msg: Message| msg.text().map(str::to_owned))
        .filter(|text: String| !text.trim_start().starts_with('/'))
        .endpoint(move |bot: Bot, msg: Message, text: String| {
            let deps = deps.clone();
            async move {
                deps.request_handler.handle_url(&bot, msg.chat.id, msg.id, &text).await;
                Ok(())
            }
        })
}
