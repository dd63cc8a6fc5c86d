//! Outbound messaging used by the request handler.
//!
//! [`Messenger`] is implemented for [`teloxide::Bot`]; tests use an in-memory
//! recorder instead.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};

use crate::core::error::AppResult;

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message and return its id so it can be edited later
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageId>;

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()>;

    /// Upload a local video file with a caption
    async fn send_video(&self, chat_id: ChatId, path: &Path, caption: &str) -> AppResult<()>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()>;
}

#[async_trait]
impl Messenger for Bot {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageId> {
        let message = self.send_message(chat_id, text).await?;
        Ok(message.id)
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()> {
        self.edit_message_text(chat_id, message_id, text).await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: ChatId, path: &Path, caption: &str) -> AppResult<()> {
        // InputFile reads lazily; fail with the path before starting the upload
        fs_err::tokio::metadata(path).await?;
        Requester::send_video(self, chat_id, InputFile::file(path.to_path_buf()))
            .caption(caption)
            .supports_streaming(true)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        Requester::delete_message(self, chat_id, message_id).await?;
        Ok(())
    }
}
