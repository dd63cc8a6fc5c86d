use std::fmt;
use std::time::Duration;

use crate::download::ytdlp_errors::YtDlpErrorType;

/// Structured error type for download operations.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp ran and reported a failure (unsupported site, unavailable video, network)
    YtDlp { kind: YtDlpErrorType, message: String },
    /// The download did not finish within the configured timeout
    Timeout(Duration),
    /// yt-dlp reported success but the output file is missing
    FileNotFound(String),
    /// Process execution failure (spawn, output directory)
    Process(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::YtDlp { kind, message } => write!(f, "yt-dlp failed ({:?}): {}", kind, message),
            DownloadError::Timeout(limit) => write!(f, "download timed out after {}s", limit.as_secs()),
            DownloadError::FileNotFound(msg) => write!(f, "{}", msg),
            DownloadError::Process(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for metrics
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp { .. } => "ytdlp",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Process(_) => "process",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DownloadError::Timeout(_))
    }
}
