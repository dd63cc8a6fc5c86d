//! Download backend abstraction.
//!
//! The request handler only sees [`MediaDownloader`]; the production backend is
//! [`ytdlp::YtDlpDownloader`], tests plug in an in-memory mock.

pub mod ytdlp;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

use crate::download::error::DownloadError;

/// yt-dlp output template inside the per-request directory
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Request parameters for a download operation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// URL to download from
    pub url: Url,
    /// Directory the media is written into. Created by the backend if missing.
    pub output_dir: PathBuf,
}

impl DownloadRequest {
    pub fn new(url: Url, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url,
            output_dir: output_dir.into(),
        }
    }

    /// Full output template passed to yt-dlp (`<dir>/%(title)s.%(ext)s`)
    pub fn output_template(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_TEMPLATE)
    }
}

/// Output from a successful download operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    pub title: String,
    pub extension: String,
    /// Final path of the downloaded file
    pub path: PathBuf,
}

impl DownloadedMedia {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A backend that fetches the media behind a URL into a local file.
///
/// Implementations must not leave a child process running once the returned
/// future is dropped; the caller enforces the timeout by dropping it.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Human-readable name of this backend (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Download the media and report where it landed.
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadedMedia, DownloadError>;
}
