//! Download folder management: retention policy, sweeper and the background janitor

pub mod janitor;
pub mod retention;
pub mod sweeper;

use std::path::Path;

pub use janitor::{Janitor, JanitorHandle, JanitorState};
pub use retention::{should_delete, RetentionPolicy};
pub use sweeper::{remove_if_exists, FileRemover, FsRemover, SweepError, SweepReport, Sweeper};

/// Creates the storage root if it is missing. Safe to call repeatedly.
pub fn ensure_storage_root(path: &Path) -> std::io::Result<()> {
    fs_err::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_storage_root_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("downloads").join("nested");
        ensure_storage_root(&root).unwrap();
        ensure_storage_root(&root).unwrap();
        assert!(root.is_dir());
    }
}
