//! Working tree and index status snapshots

use git2::{Repository, Status, StatusOptions};
use serde::Serialize;

use crate::Result;

const STAGED: Status = Status::INDEX_NEW
    .union(Status::INDEX_MODIFIED)
    .union(Status::INDEX_DELETED)
    .union(Status::INDEX_RENAMED)
    .union(Status::INDEX_TYPECHANGE);

/// Point-in-time view of what is staged, untracked and conflicted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryStatus {
    /// Paths whose index content differs from HEAD
    pub staged_files: Vec<String>,

    /// Working-tree paths unknown to the index (ignored files excluded)
    pub untracked_files: Vec<String>,

    pub has_conflicts: bool,
}

impl RepositoryStatus {
    /// Compute a fresh snapshot, re-reading the index from disk first.
    pub fn collect(repo: &Repository) -> Result<Self> {
        // Transactions write the index through their own handle.
        repo.index()?.read(true)?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let mut status = Self::default();
        for entry in repo.statuses(Some(&mut opts))?.iter() {
            let flags = entry.status();
            let path = String::from_utf8_lossy(entry.path_bytes()).into_owned();

            if flags.is_conflicted() {
                status.has_conflicts = true;
            }
            if flags.intersects(STAGED) {
                status.staged_files.push(path.clone());
            }
            if flags.is_wt_new() {
                status.untracked_files.push(path);
            }
        }

        status.staged_files.sort();
        status.untracked_files.sort();
        Ok(status)
    }

    pub fn is_clean(&self) -> bool {
        self.staged_files.is_empty() && self.untracked_files.is_empty() && !self.has_conflicts
    }
}
