//! Link handling: download, size check, delivery and local cleanup.
//!
//! Every request downloads into its own directory under the storage root,
//! named `<chat>-<message>`, so a failed or timed out download can be cleaned
//! up without touching other requests. Whatever the outcome, nothing from the
//! request is left on disk once [`RequestHandler::handle_url`] returns; the
//! janitor only catches what a crash leaves behind.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use teloxide::types::{ChatId, MessageId};

use crate::core::config::Config;
use crate::core::metrics;
use crate::core::utils::{caption_title, format_mib, parse_media_url};
use crate::download::{DownloadError, DownloadRequest, DownloadedMedia, MediaDownloader};
use crate::storage::remove_if_exists;
use crate::telegram::messenger::Messenger;

pub const START_TEXT: &str = "👋 Hi! Send me a link to a video and I will download it for you.";
pub const HELP_TEXT: &str = "Send a link (http:// or https://) to a video. I will download it and send it back here.\n\nVideos larger than the Telegram limit cannot be delivered.";
pub const INVALID_URL_TEXT: &str = "Please send a valid link starting with http:// or https://";
pub const DOWNLOADING_TEXT: &str = "⏳ Downloading…";
pub const SENDING_TEXT: &str = "📤 Sending…";
pub const DOWNLOAD_FAILED_TEXT: &str = "❌ Could not download this video. Check the link and try again.";
pub const TIMEOUT_TEXT: &str = "⌛ The download took too long and was stopped. Try again later.";
pub const DELIVERY_FAILED_TEXT: &str = "❌ Something went wrong while sending the video. Try again later.";

/// How a single link request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Delivered,
    InvalidUrl,
    DownloadFailed,
    TimedOut,
    Oversize { size_bytes: u64 },
    DeliveryFailed,
}

impl RequestOutcome {
    /// Label for the requests metric
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOutcome::Delivered => "delivered",
            RequestOutcome::InvalidUrl => "invalid_url",
            RequestOutcome::DownloadFailed => "download_failed",
            RequestOutcome::TimedOut => "timed_out",
            RequestOutcome::Oversize { .. } => "oversize",
            RequestOutcome::DeliveryFailed => "delivery_failed",
        }
    }
}

pub fn oversize_text(size_bytes: u64, limit_bytes: u64) -> String {
    format!(
        "❌ The video is too large ({} MiB). The limit is {} MiB.",
        format_mib(size_bytes),
        format_mib(limit_bytes)
    )
}

pub fn caption_for(path: &Path) -> String {
    format!("Your video: {}", caption_title(path))
}

pub struct RequestHandler {
    downloader: Arc<dyn MediaDownloader>,
    storage_root: PathBuf,
    download_timeout: Duration,
    max_file_size_bytes: u64,
}

impl RequestHandler {
    pub fn new(
        downloader: Arc<dyn MediaDownloader>,
        storage_root: impl Into<PathBuf>,
        download_timeout: Duration,
        max_file_size_bytes: u64,
    ) -> Self {
        Self {
            downloader,
            storage_root: storage_root.into(),
            download_timeout,
            max_file_size_bytes,
        }
    }

    pub fn from_config(config: &Config, downloader: Arc<dyn MediaDownloader>) -> Self {
        Self::new(
            downloader,
            config.storage_root.clone(),
            config.download_timeout,
            config.max_file_size_bytes,
        )
    }

    /// Per-request download directory
    pub fn request_dir(&self, chat_id: ChatId, message_id: MessageId) -> PathBuf {
        self.storage_root.join(format!("{}-{}", chat_id.0, message_id.0))
    }

    /// Handles a free-text message from `chat_id`. `message_id` is the id of
    /// the user's message and names the request directory.
    pub async fn handle_url(
        &self,
        messenger: &dyn Messenger,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> RequestOutcome {
        let outcome = self.process(messenger, chat_id, message_id, text).await;
        metrics::record_request(outcome.as_str());
        log::info!("Request {}-{} finished: {:?}", chat_id, message_id.0, outcome);
        outcome
    }

    async fn process(
        &self,
        messenger: &dyn Messenger,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> RequestOutcome {
        let Some(url) = parse_media_url(text) else {
            if let Err(e) = messenger.send_text(chat_id, INVALID_URL_TEXT).await {
                log::warn!("Failed to reply to invalid link in chat {}: {}", chat_id, e);
            }
            return RequestOutcome::InvalidUrl;
        };

        let status_id = match messenger.send_text(chat_id, DOWNLOADING_TEXT).await {
            Ok(id) => id,
            Err(e) => {
                log::error!("Failed to send status message to chat {}: {}", chat_id, e);
                return RequestOutcome::DeliveryFailed;
            }
        };

        let request_dir = self.request_dir(chat_id, message_id);
        let request = DownloadRequest::new(url, &request_dir);
        log::info!(
            "📥 Downloading {} via {} into {}",
            request.url,
            self.downloader.name(),
            request_dir.display()
        );

        let media = match self.download(&request).await {
            Ok(media) => media,
            Err(e) => {
                log::error!("Download failed for {}: {}", request.url, e);
                metrics::record_download_failure(e.subcategory());
                let (text, outcome) = if e.is_timeout() {
                    (TIMEOUT_TEXT, RequestOutcome::TimedOut)
                } else {
                    (DOWNLOAD_FAILED_TEXT, RequestOutcome::DownloadFailed)
                };
                self.edit_status(messenger, chat_id, status_id, text).await;
                cleanup_request_dir(&request_dir).await;
                return outcome;
            }
        };

        let outcome = self.deliver(messenger, chat_id, status_id, &media).await;
        cleanup_file(media.path()).await;
        cleanup_request_dir(&request_dir).await;
        outcome
    }

    /// Runs the backend bounded by the download timeout. Dropping the backend
    /// future on timeout stops the child process.
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadedMedia, DownloadError> {
        let started = Instant::now();
        let media = tokio::time::timeout(self.download_timeout, self.downloader.download(request))
            .await
            .map_err(|_| DownloadError::Timeout(self.download_timeout))??;
        metrics::DOWNLOAD_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
        Ok(media)
    }

    async fn deliver(
        &self,
        messenger: &dyn Messenger,
        chat_id: ChatId,
        status_id: MessageId,
        media: &DownloadedMedia,
    ) -> RequestOutcome {
        let size_bytes = match fs_err::tokio::metadata(media.path()).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::error!("Downloaded file is not readable: {}", e);
                metrics::record_download_failure("file_not_found");
                self.edit_status(messenger, chat_id, status_id, DOWNLOAD_FAILED_TEXT).await;
                return RequestOutcome::DownloadFailed;
            }
        };

        if size_bytes > self.max_file_size_bytes {
            log::warn!(
                "File {} is too large to send: {} MiB (limit {} MiB)",
                media.path().display(),
                format_mib(size_bytes),
                format_mib(self.max_file_size_bytes)
            );
            let text = oversize_text(size_bytes, self.max_file_size_bytes);
            self.edit_status(messenger, chat_id, status_id, &text).await;
            return RequestOutcome::Oversize { size_bytes };
        }

        self.edit_status(messenger, chat_id, status_id, SENDING_TEXT).await;

        match messenger.send_video(chat_id, media.path(), &caption_for(media.path())).await {
            Ok(()) => {
                log::info!("📤 Sent {} ({} MiB) to chat {}", media.title, format_mib(size_bytes), chat_id);
                if let Err(e) = messenger.delete_message(chat_id, status_id).await {
                    log::warn!("Failed to delete status message in chat {}: {}", chat_id, e);
                }
                RequestOutcome::Delivered
            }
            Err(e) => {
                log::error!("Failed to send video to chat {}: {}", chat_id, e);
                self.edit_status(messenger, chat_id, status_id, DELIVERY_FAILED_TEXT).await;
                RequestOutcome::DeliveryFailed
            }
        }
    }

    async fn edit_status(&self, messenger: &dyn Messenger, chat_id: ChatId, status_id: MessageId, text: &str) {
        if let Err(e) = messenger.edit_text(chat_id, status_id, text).await {
            log::warn!("Failed to update status message in chat {}: {}", chat_id, e);
        }
    }
}

/// Removes the delivered (or rejected) file; "already gone" is fine since the
/// janitor may have raced us.
async fn cleanup_file(path: &Path) {
    let owned = path.to_path_buf();
    match tokio::task::spawn_blocking(move || remove_if_exists(&owned)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => log::warn!("Failed to remove {}: {}", path.display(), e),
        Err(e) => log::warn!("File cleanup task failed for {}: {}", path.display(), e),
    }
}

async fn cleanup_request_dir(dir: &Path) {
    match fs_err::tokio::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove request directory: {}", e),
    }
}
