//! Repository handle: the entry point for reads and transactions

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{ErrorCode, Repository as GitRepository};
use vault_fs::{LockRegistry, canonicalize};

use crate::{
    AuthorConfiguration, CommitInfo, DiffConfig, Error, HistoryStream, RepositoryStatus, Result,
    Transaction, VaultConfig, commits, diff,
};

/// A directory under version control, backed by `<path>/.git`.
///
/// Safe to share between threads. Every read, [`Transaction`] and
/// [`HistoryStream`] opens a git handle of its own, so readers wait neither
/// on transactions nor on each other.
pub struct Repository {
    root: PathBuf,
    author: AuthorConfiguration,
    diff: DiffConfig,
    registry: Arc<LockRegistry>,
}

impl Repository {
    /// Open the repository at `path`, creating the directory and the git
    /// object database if they do not exist yet.
    ///
    /// Transactions are serialized through [`LockRegistry::global`].
    pub fn initialize(path: impl AsRef<Path>, author: AuthorConfiguration) -> Result<Self> {
        Self::initialize_with_registry(path, author, LockRegistry::global())
    }

    /// Like [`initialize`](Self::initialize), taking the author and diff
    /// settings from `config`.
    pub fn initialize_with_config(path: impl AsRef<Path>, config: &VaultConfig) -> Result<Self> {
        let mut repo = Self::initialize(path, config.author.clone())?;
        repo.diff = config.diff;
        Ok(repo)
    }

    /// Like [`initialize`](Self::initialize), serializing transactions
    /// through `registry` instead of the global one.
    ///
    /// Handles only exclude each other when they share a registry.
    pub fn initialize_with_registry(
        path: impl AsRef<Path>,
        author: AuthorConfiguration,
        registry: Arc<LockRegistry>,
    ) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(|e| Error::initialization(path, e))?;
        let root = canonicalize(path).map_err(|e| Error::initialization(path, e))?;

        let git = match GitRepository::open(&root) {
            Ok(git) => {
                tracing::debug!(root = %root.display(), "Opened existing repository");
                git
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                tracing::info!(root = %root.display(), "Initializing new repository");
                GitRepository::init(&root).map_err(|e| Error::initialization(&root, e))?
            }
            Err(e) => return Err(Error::initialization(&root, e)),
        };

        if git.is_bare() {
            return Err(Error::initialization(&root, "bare repositories have no working tree"));
        }

        Ok(Self {
            root,
            author,
            diff: DiffConfig::default(),
            registry,
        })
    }

    /// Canonical path of the working directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn author(&self) -> &AuthorConfiguration {
        &self.author
    }

    /// Snapshot staged, untracked and conflicted paths.
    pub fn status(&self) -> Result<RepositoryStatus> {
        RepositoryStatus::collect(&self.git()?)
    }

    /// Open a transaction, blocking until no other transaction is open for
    /// this canonical path. There is no timeout.
    pub fn begin(&self) -> Result<Transaction> {
        let guard = self.registry.acquire(&self.root)?;
        let git = GitRepository::open(guard.key())?;
        Ok(Transaction::new(git, self.author.clone(), guard))
    }

    /// Open a transaction only if none is open right now.
    pub fn try_begin(&self) -> Result<Option<Transaction>> {
        let Some(guard) = self.registry.try_acquire(&self.root)? else {
            return Ok(None);
        };
        let git = GitRepository::open(guard.key())?;
        Ok(Some(Transaction::new(git, self.author.clone(), guard)))
    }

    /// Commits most recent first; `limit == 0` returns all of them.
    pub fn get_history(&self, limit: usize) -> Result<Vec<CommitInfo>> {
        commits::list_history(&self.git()?, limit)
    }

    /// Commits that changed `relative_path`, most recent first.
    pub fn get_file_history(&self, relative_path: &str, limit: usize) -> Result<Vec<CommitInfo>> {
        commits::list_file_history(&self.git()?, relative_path, limit)
    }

    /// Unified diff of every file changed between two commits.
    pub fn get_file_differences(&self, commit_a: &str, commit_b: &str) -> Result<Vec<u8>> {
        diff::file_differences(&self.git()?, commit_a, commit_b, self.diff)
    }

    /// Same commits as `get_history(0)`, read lazily.
    pub fn history_stream(&self) -> Result<HistoryStream> {
        HistoryStream::open(&self.root)
    }

    /// Drop the handle. History on disk is unaffected, and streams or
    /// transactions opened from it keep working.
    pub fn close(self) {
        tracing::debug!(root = %self.root.display(), "Closing repository");
    }

    fn git(&self) -> Result<GitRepository> {
        Ok(GitRepository::open(&self.root)?)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("author", &self.author)
            .field("diff", &self.diff)
            .finish_non_exhaustive()
    }
}
