//! Git-backed transactional storage for Vault
//!
//! Turns a working directory into an append-only, linear git history of
//! atomic multi-file commits. Writers go through a [`Transaction`], of which
//! at most one is open per canonical repository path; history and diff
//! queries read committed state and never wait on writers.
//!
//! ```no_run
//! use vault_git::{AuthorConfiguration, Repository};
//!
//! let author = AuthorConfiguration::new("Planner", "planner@example.com");
//! let repo = Repository::initialize("/data/planner", author)?;
//!
//! std::fs::write("/data/planner/today.md", "- water plants\n")?;
//! let mut tx = repo.begin()?;
//! tx.stage(&["today.md"])?;
//! let id = tx.commit("Plan today")?;
//!
//! assert_eq!(repo.get_history(1)?[0].id, id);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod commits;
pub mod config;
pub mod diff;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod repository;
pub mod status;
pub mod stream;
pub mod transaction;

pub use commits::CommitInfo;
pub use config::{AuthorConfiguration, DiffConfig, VaultConfig};
pub use error::{Error, ErrorKind, Result};
pub use repository::Repository;
pub use status::RepositoryStatus;
pub use stream::HistoryStream;
pub use transaction::{Transaction, TransactionState};
pub use vault_fs::LockRegistry;
