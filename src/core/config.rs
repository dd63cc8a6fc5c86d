//! Process configuration
//!
//! Everything is read once at startup into a [`Config`] value which is then
//! handed to the janitor, the downloader and the request handler. Nothing
//! here is global: tests build their own `Config` through [`Config::from_lookup`].

use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable names
pub mod vars {
    pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
    pub const BOT_TOKEN: &str = "BOT_TOKEN";
    pub const TELOXIDE_TOKEN: &str = "TELOXIDE_TOKEN";
    pub const TEMP_DIR: &str = "TEMP_DIR";
    pub const FILE_RETENTION_DAYS: &str = "FILE_RETENTION_DAYS";
    pub const JANITOR_INTERVAL_HOURS: &str = "JANITOR_INTERVAL_HOURS";
    pub const JANITOR_MIN_AGE_SECS: &str = "JANITOR_MIN_AGE_SECS";
    pub const YTDL_BIN: &str = "YTDL_BIN";
    pub const YTDL_COOKIES_FILE: &str = "YTDL_COOKIES_FILE";
    pub const DOWNLOAD_TIMEOUT_SECS: &str = "DOWNLOAD_TIMEOUT_SECS";
    pub const MAX_FILE_SIZE_MB: &str = "MAX_FILE_SIZE_MB";
    pub const BOT_API_URL: &str = "BOT_API_URL";
    pub const LOG_FILE_PATH: &str = "LOG_FILE_PATH";
    pub const METRICS_ENABLED: &str = "METRICS_ENABLED";
    pub const METRICS_PORT: &str = "METRICS_PORT";
}

/// Default values
pub mod defaults {
    pub const TEMP_DIR: &str = "/tmp/video_downloads";
    pub const FILE_RETENTION_DAYS: u64 = 2;
    pub const JANITOR_INTERVAL_HOURS: u64 = 6;
    /// Files younger than this are never swept, whatever the retention says
    pub const JANITOR_MIN_AGE_SECS: u64 = 600;
    pub const YTDL_BIN: &str = "yt-dlp";
    pub const YTDL_COOKIES_FILE: &str = "cookies.txt";
    /// 4 minutes, same budget as a slow metadata fetch plus a short video
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 240;
    /// Telegram Bot API limit for files uploaded by bots
    pub const MAX_FILE_SIZE_MB: u64 = 50;
    pub const LOG_FILE_PATH: &str = "grabbot.log";
    pub const METRICS_PORT: u16 = 9090;
}

/// Request timeout for Telegram HTTP calls. Video uploads can take a while.
pub const TELEGRAM_REQUEST_TIMEOUT: Duration = Duration::from_secs(900);

const SECS_PER_HOUR: u64 = 60 * 60;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const BYTES_PER_MIB: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bot token is not set (use {} or {})", vars::TELEGRAM_TOKEN, vars::BOT_TOKEN)]
    MissingToken,

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Settings the janitor needs, split out so the sweeper does not depend on
/// bot-only settings such as the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JanitorConfig {
    pub storage_root: PathBuf,
    pub retention: Duration,
    pub interval: Duration,
    pub min_file_age: Duration,
}

#[derive(Debug)]
pub struct Config {
    /// `None` is allowed so maintenance subcommands can run without a token.
    /// The bot itself refuses to start, see [`Config::require_token`].
    pub bot_token: Option<SecretString>,
    pub storage_root: PathBuf,
    pub retention: Duration,
    pub janitor_interval: Duration,
    pub min_file_age: Duration,
    pub ytdl_bin: String,
    pub cookies_file: PathBuf,
    pub download_timeout: Duration,
    pub max_file_size_bytes: u64,
    pub bot_api_url: Option<String>,
    pub log_file_path: String,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` before this if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = non_empty(vars::TELEGRAM_TOKEN)
            .or_else(|| non_empty(vars::BOT_TOKEN))
            .or_else(|| non_empty(vars::TELOXIDE_TOKEN))
            .map(SecretString::from);

        let storage_root = expand_path(&non_empty(vars::TEMP_DIR).unwrap_or_else(|| defaults::TEMP_DIR.to_string()));

        let retention_days: u64 = parse_var(&non_empty, vars::FILE_RETENTION_DAYS, defaults::FILE_RETENTION_DAYS)?;
        if retention_days == 0 {
            return Err(ConfigError::Invalid {
                var: vars::FILE_RETENTION_DAYS,
                value: "0".to_string(),
            });
        }

        let interval_hours: u64 = parse_var(&non_empty, vars::JANITOR_INTERVAL_HOURS, defaults::JANITOR_INTERVAL_HOURS)?;
        if interval_hours == 0 {
            return Err(ConfigError::Invalid {
                var: vars::JANITOR_INTERVAL_HOURS,
                value: "0".to_string(),
            });
        }

        let min_age_secs: u64 = parse_var(&non_empty, vars::JANITOR_MIN_AGE_SECS, defaults::JANITOR_MIN_AGE_SECS)?;
        let timeout_secs: u64 = parse_var(&non_empty, vars::DOWNLOAD_TIMEOUT_SECS, defaults::DOWNLOAD_TIMEOUT_SECS)?;
        let max_size_mb: u64 = parse_var(&non_empty, vars::MAX_FILE_SIZE_MB, defaults::MAX_FILE_SIZE_MB)?;
        let metrics_enabled: bool = parse_var(&non_empty, vars::METRICS_ENABLED, false)?;
        let metrics_port: u16 = parse_var(&non_empty, vars::METRICS_PORT, defaults::METRICS_PORT)?;

        Ok(Self {
            bot_token,
            storage_root,
            retention: Duration::from_secs(scaled(vars::FILE_RETENTION_DAYS, retention_days, SECS_PER_DAY)?),
            janitor_interval: Duration::from_secs(scaled(vars::JANITOR_INTERVAL_HOURS, interval_hours, SECS_PER_HOUR)?),
            min_file_age: Duration::from_secs(min_age_secs),
            ytdl_bin: non_empty(vars::YTDL_BIN).unwrap_or_else(|| defaults::YTDL_BIN.to_string()),
            cookies_file: expand_path(
                &non_empty(vars::YTDL_COOKIES_FILE).unwrap_or_else(|| defaults::YTDL_COOKIES_FILE.to_string()),
            ),
            download_timeout: Duration::from_secs(timeout_secs),
            max_file_size_bytes: scaled(vars::MAX_FILE_SIZE_MB, max_size_mb, BYTES_PER_MIB)?,
            bot_api_url: non_empty(vars::BOT_API_URL),
            log_file_path: non_empty(vars::LOG_FILE_PATH).unwrap_or_else(|| defaults::LOG_FILE_PATH.to_string()),
            metrics_enabled,
            metrics_port,
        })
    }

    /// Returns the bot token or the fatal configuration error.
    pub fn require_token(&self) -> Result<&SecretString, ConfigError> {
        self.bot_token.as_ref().ok_or(ConfigError::MissingToken)
    }

    pub fn janitor(&self) -> JanitorConfig {
        JanitorConfig {
            storage_root: self.storage_root.clone(),
            retention: self.retention,
            interval: self.janitor_interval,
            min_file_age: self.min_file_age,
        }
    }
}

/// The cookie jar at `path`, only if the file is actually there.
///
/// Checked on every download, so a jar dropped in after startup is picked up.
pub fn existing_cookie_jar(path: &Path) -> Option<&Path> {
    path.is_file().then_some(path)
}

/// Supports tilde (~) expansion for home directory
fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// `value * factor`, rejecting values too large to represent
fn scaled(var: &'static str, value: u64, factor: u64) -> Result<u64, ConfigError> {
    value.checked_mul(factor).ok_or_else(|| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}

fn parse_var<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}
