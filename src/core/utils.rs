//! Small formatting and parsing helpers shared by the handler and the janitor

use std::path::Path;
use url::Url;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Bytes as MiB with one decimal, e.g. `60.0`
pub fn format_mib(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / BYTES_PER_MIB)
}

/// Parses user text as a downloadable link.
///
/// Only `http://` and `https://` links with a host are accepted; surrounding
/// whitespace is ignored.
pub fn parse_media_url(text: &str) -> Option<Url> {
    let trimmed = text.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return None;
    }
    Url::parse(trimmed).ok().filter(|url| url.host_str().is_some())
}

/// Caption title for a delivered file: the file name without extension
pub fn caption_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}
