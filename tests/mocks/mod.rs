//! In-memory stand-ins for the download backend and Telegram
//!
//! The request handler talks to both through traits, so tests drive it end to
//! end against a temp directory without yt-dlp or a bot token.

pub mod mock_downloader;
pub mod mock_messenger;

pub use mock_downloader::{MockBehavior, MockDownloader};
pub use mock_messenger::{MockMessenger, SentEvent};
