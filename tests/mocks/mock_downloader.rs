//! Mock download backend
//!
//! Writes files of a chosen size into the request directory, fails, or hangs,
//! depending on the configured behavior.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use grabbot::download::{DownloadError, DownloadRequest, DownloadedMedia, MediaDownloader, YtDlpErrorType};

#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Create `<output_dir>/<title>.<ext>` with `size_bytes` bytes
    Produce {
        title: String,
        ext: String,
        size_bytes: u64,
    },
    /// Leave a partial file behind, then fail like yt-dlp does
    Fail { message: String },
    /// Leave a partial file behind, then never finish
    Hang,
}

pub struct MockDownloader {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockDownloader {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn producing(title: &str, ext: &str, size_bytes: u64) -> Self {
        Self::new(MockBehavior::Produce {
            title: title.to_string(),
            ext: ext.to_string(),
            size_bytes,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn write_partial(request: &DownloadRequest) {
    std::fs::create_dir_all(&request.output_dir).unwrap();
    std::fs::write(request.output_dir.join("partial.mp4.part"), b"partial").unwrap();
}

#[async_trait]
impl MediaDownloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadedMedia, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Produce { title, ext, size_bytes } => {
                std::fs::create_dir_all(&request.output_dir).unwrap();
                let path = request.output_dir.join(format!("{}.{}", title, ext));
                // Sparse file: the size is what matters, not the content
                std::fs::File::create(&path).unwrap().set_len(*size_bytes).unwrap();
                Ok(DownloadedMedia {
                    title: title.clone(),
                    extension: ext.clone(),
                    path,
                })
            }
            MockBehavior::Fail { message } => {
                write_partial(request);
                Err(DownloadError::YtDlp {
                    kind: YtDlpErrorType::UnsupportedUrl,
                    message: message.clone(),
                })
            }
            MockBehavior::Hang => {
                write_partial(request);
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DownloadError::Process("hung download finished".into()))
            }
        }
    }
}
