//! Error types for vault-git

use std::path::PathBuf;

use crate::TransactionState;

/// Result type for vault-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vault-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot initialize repository at {path}: {message}")]
    Initialization { path: PathBuf, message: String },

    #[error("Transaction is already {state}")]
    TransactionFinalized { state: TransactionState },

    #[error("Pattern '{pattern}' matched no files")]
    StagingNoMatch { pattern: String },

    #[error("Staging failed: {message}")]
    Staging { message: String },

    #[error("Nothing staged to commit")]
    NothingToCommit,

    #[error("Commit failed: {message}")]
    Commit { message: String },

    #[error("Cannot resolve '{reference}' to a commit: {message}")]
    HistoryQuery { reference: String, message: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] vault_fs::Error),
}

/// Coarse classification used by callers that present failures to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Initialization,
    TransactionFinalized,
    Staging,
    Commit,
    HistoryQuery,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Initialization { .. } => ErrorKind::Initialization,
            Self::TransactionFinalized { .. } => ErrorKind::TransactionFinalized,
            Self::StagingNoMatch { .. } | Self::Staging { .. } => ErrorKind::Staging,
            Self::NothingToCommit | Self::Commit { .. } => ErrorKind::Commit,
            Self::HistoryQuery { .. } => ErrorKind::HistoryQuery,
            Self::Git(_) | Self::Fs(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn initialization(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Initialization {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn staging(source: git2::Error) -> Self {
        Self::Staging {
            message: source.message().to_string(),
        }
    }

    pub(crate) fn commit(source: git2::Error) -> Self {
        Self::Commit {
            message: source.message().to_string(),
        }
    }
}
