//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Cookie jar and storage configuration logging

use anyhow::Result;
use simplelog::*;
use std::fs::File;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective runtime configuration at startup.
///
/// The token is never printed. A missing cookie jar is only a warning:
/// most sites work without cookies, some will refuse with a bot check.
pub fn log_startup_configuration(config: &crate::core::config::Config) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("📁 Storage root: {}", config.storage_root.display());
    log::info!(
        "🧹 Retention: {} day(s), janitor every {}h, min file age {}s",
        config.retention.as_secs() / (24 * 60 * 60),
        config.janitor_interval.as_secs() / (60 * 60),
        config.min_file_age.as_secs()
    );
    log::info!(
        "⏱️  Download timeout: {}s, max file size: {} MiB",
        config.download_timeout.as_secs(),
        config.max_file_size_bytes / (1024 * 1024)
    );
    log_cookies_configuration(config);
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Logs whether the yt-dlp cookie jar will be used
pub fn log_cookies_configuration(config: &crate::core::config::Config) {
    match crate::core::config::existing_cookie_jar(&config.cookies_file) {
        Some(path) => {
            let shown = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            log::info!("🍪 YTDL_COOKIES_FILE: {} (will be passed to yt-dlp)", shown.display());
        }
        None => {
            log::warn!(
                "⚠️  YTDL_COOKIES_FILE: {} not found, downloading without cookies",
                config.cookies_file.display()
            );
            log::warn!("   Sites with bot checks may refuse some downloads");
        }
    }
}
