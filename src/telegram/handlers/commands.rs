//! /start and /help

use teloxide::types::ChatId;

use super::request::{HELP_TEXT, START_TEXT};
use crate::core::error::AppResult;
use crate::telegram::bot::Command;
use crate::telegram::messenger::Messenger;

pub async fn handle_command(messenger: &dyn Messenger, chat_id: ChatId, cmd: Command) -> AppResult<()> {
    let text = match cmd {
        Command::Start => START_TEXT,
        Command::Help => HELP_TEXT,
    };
    messenger.send_text(chat_id, text).await?;
    Ok(())
}
