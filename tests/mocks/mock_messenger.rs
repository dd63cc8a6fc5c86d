//! Recording mock for outbound Telegram messages

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;
use teloxide::types::{ChatId, MessageId};

use grabbot::core::error::{AppError, AppResult};
use grabbot::telegram::Messenger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentEvent {
    Text { chat_id: ChatId, message_id: MessageId, text: String },
    Edit { message_id: MessageId, text: String },
    Video {
        path: PathBuf,
        caption: String,
        /// Whether the file was on disk at upload time
        existed: bool,
    },
    Delete { message_id: MessageId },
}

pub struct MockMessenger {
    events: Mutex<Vec<SentEvent>>,
    next_id: AtomicI32,
    fail_video: AtomicBool,
}

impl Default for MockMessenger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMessenger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1000),
            fail_video: AtomicBool::new(false),
        }
    }

    /// Make every `send_video` call fail
    pub fn failing_video() -> Self {
        let messenger = Self::new();
        messenger.fail_video.store(true, Ordering::SeqCst);
        messenger
    }

    pub fn events(&self) -> Vec<SentEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Texts of all sends and edits, in order
    pub fn texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SentEvent::Text { text, .. } | SentEvent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }

    pub fn videos(&self) -> Vec<SentEvent> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, SentEvent::Video { .. }))
            .collect()
    }

    fn push(&self, event: SentEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageId> {
        let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.push(SentEvent::Text {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(message_id)
    }

    async fn edit_text(&self, _chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()> {
        self.push(SentEvent::Edit {
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_video(&self, _chat_id: ChatId, path: &Path, caption: &str) -> AppResult<()> {
        self.push(SentEvent::Video {
            path: path.to_path_buf(),
            caption: caption.to_string(),
            existed: path.exists(),
        });
        if self.fail_video.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other("upload rejected")));
        }
        Ok(())
    }

    async fn delete_message(&self, _chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        self.push(SentEvent::Delete { message_id });
        Ok(())
    }
}
