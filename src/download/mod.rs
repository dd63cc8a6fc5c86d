//! Media download: backend trait, yt-dlp implementation and error types

pub mod error;
pub mod source;
pub mod ytdlp_errors;

pub use error::DownloadError;
pub use source::ytdlp::YtDlpDownloader;
pub use source::{DownloadRequest, DownloadedMedia, MediaDownloader};
pub use ytdlp_errors::YtDlpErrorType;
