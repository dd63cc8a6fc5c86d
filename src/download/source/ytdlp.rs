//! yt-dlp backend.
//!
//! Runs yt-dlp as a child process, one invocation per request. The final file
//! path comes from yt-dlp itself through `--print after_move:...`, so
//! post-processing renames (merges, remuxes) are picked up without guessing.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use crate::core::config::{existing_cookie_jar, Config};
use crate::download::error::DownloadError;
use crate::download::source::{DownloadRequest, DownloadedMedia, MediaDownloader};
use crate::download::ytdlp_errors::{analyze_ytdlp_error, fix_hint, last_error_line};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "Accept-Language:en-US,en;q=0.9";
const PRINT_TEMPLATE: &str = "after_move:%(.{title,ext,filepath})j";

/// One JSON line printed by yt-dlp after the file reached its final location
#[derive(Debug, Deserialize)]
struct PrintedMedia {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    ext: Option<String>,
    filepath: Option<PathBuf>,
}

pub struct YtDlpDownloader {
    bin: String,
    cookies_file: PathBuf,
}

impl YtDlpDownloader {
    pub fn new(config: &Config) -> Self {
        Self {
            bin: config.ytdl_bin.clone(),
            cookies_file: config.cookies_file.clone(),
        }
    }

    /// Full argument list for one download
    pub fn build_args(request: &DownloadRequest, cookies: Option<&Path>) -> Vec<String> {
        let mut args: Vec<String> = [
            "-f",
            "best",
            "--no-playlist",
            "--retries",
            "10",
            "--extractor-retries",
            "3",
            "--fragment-retries",
            "10",
            "--http-chunk-size",
            "10M",
            "--user-agent",
            USER_AGENT,
            "--add-header",
            ACCEPT_LANGUAGE,
            "--geo-bypass",
            "--no-warnings",
            "--print",
            PRINT_TEMPLATE,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(cookies) = cookies {
            args.push("--cookies".to_string());
            args.push(cookies.display().to_string());
        }

        args.push("-o".to_string());
        args.push(request.output_template().display().to_string());
        args.push(request.url.as_str().to_string());
        args
    }
}

/// Picks the last printed JSON object from yt-dlp stdout.
fn parse_printed_media(stdout: &str) -> Option<DownloadedMedia> {
    stdout
        .lines()
        .rev()
        .filter_map(|line| serde_json::from_str::<PrintedMedia>(line.trim()).ok())
        .find_map(|printed| {
            let path = printed.filepath?;
            let extension = printed
                .ext
                .or_else(|| path.extension().map(|e| e.to_string_lossy().into_owned()))
                .unwrap_or_default();
            let title = printed
                .title
                .unwrap_or_else(|| crate::core::utils::caption_title(&path));
            Some(DownloadedMedia { title, extension, path })
        })
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadedMedia, DownloadError> {
        fs_err::tokio::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| DownloadError::Process(format!("cannot create download directory: {}", e)))?;

        let args = Self::build_args(request, existing_cookie_jar(&self.cookies_file));
        log::debug!("yt-dlp command: {} {}", self.bin, args.join(" "));

        let started = Instant::now();
        // kill_on_drop: a caller-side timeout drops this future and must stop yt-dlp
        let output = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DownloadError::Process(format!("failed to run {}: {}", self.bin, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let kind = analyze_ytdlp_error(&stderr);
            log::error!(
                "yt-dlp failed for {} ({}, {:?}): {} | hint: {}",
                request.url,
                output.status,
                kind,
                last_error_line(&stderr),
                fix_hint(kind)
            );
            return Err(DownloadError::YtDlp {
                kind,
                message: last_error_line(&stderr),
            });
        }

        let media = parse_printed_media(&stdout).ok_or_else(|| {
            DownloadError::FileNotFound(format!("yt-dlp did not report an output file for {}", request.url))
        })?;

        if !fs_err::tokio::metadata(&media.path).await.is_ok_and(|m| m.is_file()) {
            return Err(DownloadError::FileNotFound(format!(
                "downloaded file is missing: {}",
                media.path.display()
            )));
        }

        log::info!(
            "✅ yt-dlp downloaded \"{}\" to {} in {:.1}s",
            media.title,
            media.path.display(),
            started.elapsed().as_secs_f64()
        );
        Ok(media)
    }
}
