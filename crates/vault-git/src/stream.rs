//! Lazy, one-shot enumeration of commit history

use std::iter::FusedIterator;
use std::path::Path;

use git2::{Oid, Repository};

use crate::Result;
use crate::commits::{CommitInfo, head_commit_id};

/// Commits from HEAD backwards along first parents, read one at a time.
///
/// The stream owns its own git handle, so it can outlive the borrow of the
/// [`Repository`](crate::Repository) that created it and releases the handle
/// when dropped, drained or not. After yielding an error it yields nothing
/// more.
pub struct HistoryStream {
    repo: Repository,
    next: Option<Oid>,
}

impl HistoryStream {
    pub(crate) fn open(root: &Path) -> Result<Self> {
        let repo = Repository::open(root)?;
        let next = head_commit_id(&repo)?;
        tracing::debug!(root = %root.display(), "Opened history stream");
        Ok(Self { repo, next })
    }

    fn read(&self, id: Oid) -> Result<(CommitInfo, Option<Oid>)> {
        let commit = self.repo.find_commit(id)?;
        let parent = commit.parent_ids().next();
        Ok((CommitInfo::from_commit(&commit), parent))
    }
}

impl Iterator for HistoryStream {
    type Item = Result<CommitInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.read(id) {
            Ok((info, parent)) => {
                self.next = parent;
                Some(Ok(info))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl FusedIterator for HistoryStream {}

impl std::fmt::Debug for HistoryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStream")
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}
