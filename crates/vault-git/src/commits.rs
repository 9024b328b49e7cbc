//! Commit history extraction.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, ErrorCode, Oid, Repository, Sort, Tree};
use serde::Serialize;
use vault_fs::NormalizedPath;

use crate::Result;

/// Information about a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// Full commit hash (40 hex characters)
    pub id: String,

    /// Commit author name
    pub author: String,

    /// Commit author email
    pub email: String,

    /// Author timestamp
    pub timestamp: DateTime<Utc>,

    /// Full commit message
    pub message: String,
}

impl CommitInfo {
    pub(crate) fn from_commit(commit: &Commit<'_>) -> Self {
        let author = commit.author();
        let timestamp = Utc
            .timestamp_opt(author.when().seconds(), 0)
            .single()
            .unwrap_or_default();

        Self {
            id: commit.id().to_string(),
            author: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
            timestamp,
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        }
    }

    /// Abbreviated hash (7 characters)
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(7)]
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Resolve HEAD to a commit id, or `None` while the branch is unborn.
pub(crate) fn head_commit_id(repo: &Repository) -> Result<Option<Oid>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List commits reachable from HEAD, most recent first.
///
/// Follows first parents only, which for the linear histories this crate
/// writes is the whole history. `limit == 0` means no limit.
pub fn list_history(repo: &Repository, limit: usize) -> Result<Vec<CommitInfo>> {
    let mut commits = Vec::new();
    walk_first_parents(repo, |commit| {
        commits.push(CommitInfo::from_commit(commit));
        Ok(limit == 0 || commits.len() < limit)
    })?;
    Ok(commits)
}

/// List commits that changed the file at `relative_path`, most recent first.
///
/// A commit counts when the blob at that path differs from its first
/// parent's, which covers creation, modification and deletion.
pub fn list_file_history(
    repo: &Repository,
    relative_path: &str,
    limit: usize,
) -> Result<Vec<CommitInfo>> {
    let normalized = NormalizedPath::new(relative_path);
    let path = normalized.as_relative();
    if path.is_empty() || NormalizedPath::escapes_root(relative_path) {
        return Ok(Vec::new());
    }

    let mut commits = Vec::new();
    walk_first_parents(repo, |commit| {
        let current = entry_id(&commit.tree()?, path)?;
        let previous = match commit.parents().next() {
            Some(parent) => entry_id(&parent.tree()?, path)?,
            None => None,
        };

        if current != previous {
            commits.push(CommitInfo::from_commit(commit));
        }
        Ok(limit == 0 || commits.len() < limit)
    })?;

    tracing::debug!(path, found = commits.len(), "Collected file history");
    Ok(commits)
}

/// Visit commits from HEAD along first parents until `visit` returns false.
fn walk_first_parents(
    repo: &Repository,
    mut visit: impl FnMut(&Commit<'_>) -> Result<bool>,
) -> Result<()> {
    let Some(head) = head_commit_id(repo)? else {
        return Ok(());
    };

    let mut revwalk = repo.revwalk()?;
    revwalk.push(head)?;
    revwalk.simplify_first_parent()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL)?;

    for oid_result in revwalk {
        let commit = repo.find_commit(oid_result?)?;
        if !visit(&commit)? {
            break;
        }
    }

    Ok(())
}

fn entry_id(tree: &Tree<'_>, path: &str) -> Result<Option<Oid>> {
    match tree.get_path(std::path::Path::new(path)) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
