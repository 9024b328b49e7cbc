//! Transactions: one atomic set of file changes becoming one commit
//!
//! A [`Transaction`] holds the repository's [`PathLockGuard`] from
//! [`Repository::begin`](crate::Repository::begin) until it is committed,
//! canceled or dropped, so at most one is open per canonical path.
//!
//! ```text
//! Open --stage--> Open
//! Open --commit--> Committed
//! Open --cancel--> Canceled
//! ```
//!
//! Staging uses the repository's git index as the pending commit. Patterns
//! are git pathspecs relative to the repository root:
//!
//! - `.`, `./`, `*` and the empty string stage everything;
//! - a leading `./` is dropped and `\` is read as a path separator;
//! - `..` is resolved lexically and may not climb above the root;
//! - a plain name selects that file, or everything under that directory;
//! - `*`, `?` and `[...]` follow git fnmatch rules, where `*` also crosses
//!   `/` (`*.txt` matches `notes/a.txt`);
//! - ignored files are skipped, and tracked files missing from the working
//!   tree are staged as deletions.
//!
//! Every pattern must match at least one working-tree file or tracked index
//! entry, otherwise staging fails with [`Error::StagingNoMatch`].

use std::fmt;
use std::path::PathBuf;

use git2::{Commit, Index, IndexAddOption, Pathspec, PathspecFlags, Repository};
use vault_fs::{NormalizedPath, PathLockGuard};

use crate::commits::head_commit_id;
use crate::{AuthorConfiguration, Error, Result};

/// Lifecycle of a [`Transaction`]. `Committed` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Open,
    Committed,
    Canceled,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Committed => "committed",
            Self::Canceled => "canceled",
        };
        f.write_str(name)
    }
}

/// Exclusive right to add the next commit to one repository.
///
/// Dropping an open transaction cancels it.
pub struct Transaction {
    repo: Repository,
    author: AuthorConfiguration,
    state: TransactionState,
    guard: Option<PathLockGuard>,
    root: PathBuf,
}

impl Transaction {
    pub(crate) fn new(repo: Repository, author: AuthorConfiguration, guard: PathLockGuard) -> Self {
        let root = guard.key().to_path_buf();
        tracing::debug!(root = %root.display(), "Transaction opened");
        Self {
            repo,
            author,
            state: TransactionState::Open,
            guard: Some(guard),
            root,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Add the current content of every file matching `patterns` to the
    /// pending commit.
    ///
    /// On failure nothing from this call is staged and the transaction stays
    /// open, so the caller may retry or cancel.
    pub fn stage<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<()> {
        self.ensure_open()?;
        if patterns.is_empty() {
            return Err(Error::Staging {
                message: "no patterns given".into(),
            });
        }

        let pathspecs = patterns
            .iter()
            .map(|p| normalize_pattern(p.as_ref()))
            .collect::<Result<Vec<String>>>()?;

        let mut index = self.repo.index().map_err(Error::staging)?;
        index.read(true).map_err(Error::staging)?;

        for (pattern, spec) in patterns.iter().zip(&pathspecs) {
            if !self.matches_anything(&index, spec)? {
                return Err(Error::StagingNoMatch {
                    pattern: pattern.as_ref().to_string(),
                });
            }
        }

        let applied = apply_pathspecs(&mut index, &pathspecs);
        if let Err(e) = applied {
            // Drop partial in-memory changes so a later commit cannot see them.
            let _ = index.read(true);
            return Err(e);
        }

        tracing::debug!(root = %self.root.display(), ?pathspecs, "Staged files");
        Ok(())
    }

    /// Record everything staged as a new commit and return its 40-hex id.
    ///
    /// The lock is released whether or not the commit succeeds. On failure
    /// the index is reset to HEAD and the transaction ends `Canceled`.
    pub fn commit(&mut self, message: &str) -> Result<String> {
        self.ensure_open()?;
        let _guard = self.guard.take();

        match self.write_commit(message) {
            Ok(id) => {
                self.state = TransactionState::Committed;
                tracing::debug!(root = %self.root.display(), %id, "Transaction committed");
                Ok(id)
            }
            Err(e) => {
                if let Err(reset_err) = self.reset_index() {
                    tracing::warn!(
                        root = %self.root.display(),
                        error = %reset_err,
                        "Failed to reset index after failed commit"
                    );
                }
                self.state = TransactionState::Canceled;
                tracing::debug!(root = %self.root.display(), error = %e, "Commit failed");
                Err(e)
            }
        }
    }

    /// Discard staged changes and release the lock.
    ///
    /// Working-tree files are left alone. Calling this on a committed or
    /// canceled transaction does nothing.
    pub fn cancel(&mut self) -> Result<()> {
        if self.state != TransactionState::Open {
            return Ok(());
        }
        let _guard = self.guard.take();
        self.state = TransactionState::Canceled;
        tracing::debug!(root = %self.root.display(), "Transaction canceled");
        self.reset_index()
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            TransactionState::Open => Ok(()),
            state => Err(Error::TransactionFinalized { state }),
        }
    }

    fn matches_anything(&self, index: &Index, spec: &str) -> Result<bool> {
        let pathspec = Pathspec::new([spec]).map_err(Error::staging)?;

        let in_workdir = pathspec
            .match_workdir(&self.repo, PathspecFlags::DEFAULT)
            .map_err(Error::staging)?
            .entries()
            .next()
            .is_some();
        if in_workdir {
            return Ok(true);
        }

        let in_index = pathspec
            .match_index(index, PathspecFlags::DEFAULT)
            .map_err(Error::staging)?
            .entries()
            .next()
            .is_some();
        Ok(in_index)
    }

    fn write_commit(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index().map_err(Error::commit)?;
        let tree_id = index.write_tree().map_err(Error::commit)?;

        let parent = match head_commit_id(&self.repo).map_err(|e| Error::Commit {
            message: e.to_string(),
        })? {
            Some(id) => Some(self.repo.find_commit(id).map_err(Error::commit)?),
            None => None,
        };

        let unchanged = match &parent {
            Some(head) => head.tree_id() == tree_id,
            None => index.is_empty(),
        };
        if unchanged {
            return Err(Error::NothingToCommit);
        }

        let tree = self.repo.find_tree(tree_id).map_err(Error::commit)?;
        let signature = self.author.signature().map_err(Error::commit)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let id = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(Error::commit)?;
        Ok(id.to_string())
    }

    fn reset_index(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        match head_commit_id(&self.repo)? {
            Some(id) => index.read_tree(&self.repo.find_commit(id)?.tree()?)?,
            None => index.clear()?,
        }
        index.write()?;
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == TransactionState::Open {
            tracing::debug!(root = %self.root.display(), "Open transaction dropped, canceling");
            if let Err(e) = self.cancel() {
                tracing::warn!(
                    root = %self.root.display(),
                    error = %e,
                    "Failed to reset index for abandoned transaction"
                );
            }
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("root", &self.root)
            .field("state", &self.state)
            .field("author", &self.author)
            .finish_non_exhaustive()
    }
}

fn apply_pathspecs(index: &mut Index, pathspecs: &[String]) -> Result<()> {
    let specs = || pathspecs.iter().map(String::as_str);
    index
        .add_all(specs(), IndexAddOption::DEFAULT, None)
        .map_err(Error::staging)?;
    index.update_all(specs(), None).map_err(Error::staging)?;
    index.write().map_err(Error::staging)?;
    Ok(())
}

/// Turn a caller pattern into the pathspec handed to git.
///
/// Patterns reaching above the repository root cannot match anything in it.
fn normalize_pattern(pattern: &str) -> Result<String> {
    if NormalizedPath::escapes_root(pattern) {
        return Err(Error::StagingNoMatch {
            pattern: pattern.to_string(),
        });
    }

    let normalized = NormalizedPath::new(pattern);
    let spec = match normalized.as_relative() {
        "" | "*" => "*".to_string(),
        relative => relative.to_string(),
    };
    Ok(spec)
}
