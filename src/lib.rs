//! grabbot - Telegram bot that downloads videos from links
//!
//! A user sends a link, the bot fetches the media with yt-dlp into a local
//! download folder and sends it back as a video. A background janitor deletes
//! files older than the retention window from that folder.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, metrics
//! - `storage`: retention policy, directory sweeper and the janitor scheduler
//! - `download`: download backend trait and the yt-dlp backend
//! - `telegram`: bot setup, messaging and the request handler

pub mod cli;
pub mod core;
pub mod download;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Config};
pub use storage::{Janitor, JanitorHandle, SweepReport, Sweeper};
