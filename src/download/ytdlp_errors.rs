//! Classification of yt-dlp failures from its stderr.
//!
//! Users always get the same generic failure text; the classification feeds
//! logs and metrics so operators can tell a stale cookie jar from a dead link.

/// yt-dlp error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// Cookies are invalid or expired
    InvalidCookies,
    /// The site detected automated access
    BotDetection,
    /// Private, removed or region-locked media
    VideoUnavailable,
    /// No extractor for the URL
    UnsupportedUrl,
    /// Timeouts, refused connections, DNS
    NetworkError,
    Unknown,
}

/// Determines the error category from yt-dlp stderr
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("cookies are no longer valid")
        || stderr_lower.contains("cookies have likely been rotated")
        || stderr_lower.contains("use --cookies-from-browser")
        || stderr_lower.contains("use --cookies for the authentication")
    {
        return YtDlpErrorType::InvalidCookies;
    }

    if stderr_lower.contains("sign in to confirm you're not a bot")
        || stderr_lower.contains("bot detection")
        || stderr_lower.contains("http error 403")
        || stderr_lower.contains("http error 429")
    {
        return YtDlpErrorType::BotDetection;
    }

    if stderr_lower.contains("unsupported url") || stderr_lower.contains("is not a valid url") {
        return YtDlpErrorType::UnsupportedUrl;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("this video is not available")
        || stderr_lower.contains("video has been removed")
        || stderr_lower.contains("not available in your country")
        || stderr_lower.contains("http error 404")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("timeout")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network is unreachable")
        || stderr_lower.contains("name or service not known")
        || stderr_lower.contains("temporary failure in name resolution")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Operator hint logged next to the failure
pub fn fix_hint(error_type: YtDlpErrorType) -> &'static str {
    match error_type {
        YtDlpErrorType::InvalidCookies => "refresh the cookie jar at YTDL_COOKIES_FILE (Netscape format)",
        YtDlpErrorType::BotDetection => "provide fresh cookies or update yt-dlp",
        YtDlpErrorType::VideoUnavailable => "media is private, removed or region-locked; no action needed",
        YtDlpErrorType::UnsupportedUrl => "site is not supported by yt-dlp; no action needed",
        YtDlpErrorType::NetworkError => "check connectivity from the bot host",
        YtDlpErrorType::Unknown => "check the full yt-dlp output and update yt-dlp",
    }
}

/// The most useful line of yt-dlp stderr: the last `ERROR:` line, or the last
/// non-empty line if there is none.
pub fn last_error_line(stderr: &str) -> String {
    let lines = stderr.lines().map(str::trim).filter(|line| !line.is_empty());
    lines
        .clone()
        .filter(|line| line.starts_with("ERROR:"))
        .last()
        .or_else(|| lines.last())
        .unwrap_or("yt-dlp exited without output")
        .to_string()
}
