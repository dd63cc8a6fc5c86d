//! Retention policy: decides whether a file is old enough to be removed.

use std::time::{Duration, SystemTime};

/// Returns true if and only if `last_modified < now - retention`.
///
/// A file modified exactly at the cutoff is kept. When `now - retention`
/// cannot be represented (retention reaching before the platform epoch)
/// nothing can be older than the cutoff, so the file is kept.
pub fn should_delete(last_modified: SystemTime, now: SystemTime, retention: Duration) -> bool {
    match now.checked_sub(retention) {
        Some(cutoff) => last_modified < cutoff,
        None => false,
    }
}

/// Retention window plus the minimum-age safety margin.
///
/// The margin keeps files that a request may still be writing or sending
/// out of reach even if the retention window is configured very short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention: Duration,
    pub min_file_age: Duration,
}

impl RetentionPolicy {
    pub fn new(retention: Duration, min_file_age: Duration) -> Self {
        Self {
            retention,
            min_file_age,
        }
    }

    /// The window actually applied: the larger of retention and margin
    pub fn effective_window(&self) -> Duration {
        self.retention.max(self.min_file_age)
    }

    pub fn is_expired(&self, last_modified: SystemTime, now: SystemTime) -> bool {
        should_delete(last_modified, now, self.effective_window())
    }
}
