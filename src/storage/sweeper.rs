//! Directory sweeper: one pass over the storage root that deletes every
//! regular file older than the retention window.
//!
//! The sweep never fails because of a single file. Stat and delete errors are
//! logged, counted in [`SweepReport::failed`] and the walk continues. The only
//! error returned to the caller is a storage root that exists but cannot be
//! listed at all.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

use crate::core::config::JanitorConfig;
use crate::core::metrics;
use crate::core::utils::format_mib;
use crate::storage::retention::RetentionPolicy;

#[derive(Debug, Error)]
pub enum SweepError {
    /// Stat or delete of a single file failed. Logged, never returned.
    #[error("failed to sweep {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The storage root exists but cannot be listed
    #[error("cannot read storage root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A sweep cycle failed as a whole (error or panic inside the sweep task)
    #[error("sweep cycle failed: {0}")]
    Cycle(String),
}

/// Result of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files removed (or that would be removed, in dry-run mode)
    pub deleted_count: u64,
    /// Sum of the sizes of the removed files
    pub freed_bytes: u64,
    /// Regular files looked at
    pub scanned: u64,
    /// Entries skipped because stat, list or delete failed
    pub failed: u64,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.deleted_count == 0 && self.freed_bytes == 0
    }
}

/// Deletes one file from disk.
///
/// Seam for the sweeper so deletion failures can be exercised in tests.
pub trait FileRemover: Send + Sync {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        fs_err::remove_file(path)
    }
}

/// Removes `path`, treating "already gone" as success.
///
/// Returns `Ok(true)` if this call removed the file, `Ok(false)` if it did not
/// exist. Used by both the request handler and the sweeper, which may race on
/// the same file.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs_err::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub struct Sweeper {
    root: PathBuf,
    policy: RetentionPolicy,
    remover: Arc<dyn FileRemover>,
    dry_run: bool,
}

impl Sweeper {
    pub fn new(config: &JanitorConfig) -> Self {
        Self {
            root: config.storage_root.clone(),
            policy: RetentionPolicy::new(config.retention, config.min_file_age),
            remover: Arc::new(FsRemover),
            dry_run: false,
        }
    }

    pub fn with_remover(mut self, remover: Arc<dyn FileRemover>) -> Self {
        self.remover = remover;
        self
    }

    /// Only evaluate: report what would be deleted, delete nothing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sweeps with the current time as the cutoff reference.
    pub fn sweep(&self) -> Result<SweepReport, SweepError> {
        self.sweep_at(SystemTime::now())
    }

    /// Sweeps using `now` as the single cutoff reference for every file,
    /// however long the walk takes.
    pub fn sweep_at(&self, now: SystemTime) -> Result<SweepReport, SweepError> {
        let mut report = SweepReport::default();

        if !self.root.exists() {
            log::debug!("Storage root {} does not exist yet, nothing to sweep", self.root.display());
            return Ok(report);
        }

        let root_entries = fs_err::read_dir(&self.root).map_err(|source| SweepError::Root {
            path: self.root.clone(),
            source,
        })?;

        let mut pending: Vec<fs_err::ReadDir> = vec![root_entries];
        while let Some(mut entries) = pending.pop() {
            let Some(entry) = entries.next() else {
                continue;
            };
            // Resume this directory after the current entry
            pending.push(entries);

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Janitor: failed to read directory entry: {}", e);
                    report.failed += 1;
                    continue;
                }
            };
            let path = entry.path();

            // file_type() does not follow symlinks: links are neither
            // followed nor deleted.
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(source) => {
                    self.skip(&mut report, path, source);
                    continue;
                }
            };

            if file_type.is_dir() {
                match fs_err::read_dir(&path) {
                    Ok(sub) => pending.push(sub),
                    Err(source) => self.skip(&mut report, path, source),
                }
            } else if file_type.is_file() {
                self.sweep_file(&mut report, path, now);
            }
        }

        if report.is_empty() {
            log::info!(
                "🧹 Janitor: nothing to delete in {} ({} file(s) scanned, {} failed)",
                self.root.display(),
                report.scanned,
                report.failed
            );
        } else {
            log::info!(
                "🧹 Janitor: {} {} file(s), {} MiB in {} ({} scanned, {} failed)",
                if self.dry_run { "would delete" } else { "deleted" },
                report.deleted_count,
                format_mib(report.freed_bytes),
                self.root.display(),
                report.scanned,
                report.failed
            );
        }

        if !self.dry_run {
            metrics::record_sweep(report.deleted_count, report.freed_bytes, report.failed);
        }

        Ok(report)
    }

    fn sweep_file(&self, report: &mut SweepReport, path: PathBuf, now: SystemTime) {
        report.scanned += 1;

        let metadata = match fs_err::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Janitor: {} vanished before stat", path.display());
                return;
            }
            Err(source) => return self.skip(report, path, source),
        };
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(source) => return self.skip(report, path, source),
        };

        if !self.policy.is_expired(modified, now) {
            return;
        }

        if self.dry_run {
            report.deleted_count += 1;
            report.freed_bytes += metadata.len();
            return;
        }

        match self.remover.remove(&path) {
            Ok(()) => {
                log::debug!("Janitor: removed {} ({} bytes)", path.display(), metadata.len());
                report.deleted_count += 1;
                report.freed_bytes += metadata.len();
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Removed concurrently by a request handler
                log::debug!("Janitor: {} already removed", path.display());
            }
            Err(source) => self.skip(report, path, source),
        }
    }

    fn skip(&self, report: &mut SweepReport, path: PathBuf, source: io::Error) {
        report.failed += 1;
        log::warn!("Janitor: {}", SweepError::File { path, source });
    }
}
