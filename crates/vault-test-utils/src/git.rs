//! Independent readers of on-disk git state.
//!
//! These open the repository with plain `git2` so assertions do not depend
//! on the code under test.

use std::path::Path;

fn open(path: &Path) -> git2::Repository {
    git2::Repository::open(path).unwrap_or_else(|e| {
        panic!("git: failed to open repository at {}: {e}", path.display())
    })
}

/// Messages of every commit reachable from HEAD, newest first.
///
/// Returns an empty list for a repository without commits.
///
/// # Panics
/// Panics if the repository cannot be read.
pub fn log_messages(path: &Path) -> Vec<String> {
    let repo = open(path);
    let Ok(head) = repo.head() else {
        return Vec::new();
    };
    let mut commit = Some(head.peel_to_commit().unwrap());
    let mut messages = Vec::new();
    while let Some(current) = commit {
        messages.push(current.message().unwrap_or("").to_string());
        commit = current.parents().next();
    }
    messages
}

/// Number of commits reachable from HEAD.
pub fn commit_count(path: &Path) -> usize {
    log_messages(path).len()
}

/// Content of `file` as committed in HEAD, or `None` if absent.
///
/// # Panics
/// Panics if HEAD cannot be resolved.
pub fn head_file(path: &Path, file: &str) -> Option<String> {
    let repo = open(path);
    let tree = repo.head().unwrap().peel_to_tree().unwrap();
    let entry = tree.get_path(Path::new(file)).ok()?;
    let blob = repo.find_blob(entry.id()).unwrap();
    Some(String::from_utf8_lossy(blob.content()).into_owned())
}

/// Number of parents of every commit reachable from HEAD, newest first.
pub fn parent_counts(path: &Path) -> Vec<usize> {
    let repo = open(path);
    let Ok(head) = repo.head() else {
        return Vec::new();
    };
    let mut revwalk = repo.revwalk().unwrap();
    revwalk.push(head.target().unwrap()).unwrap();
    revwalk
        .map(|oid| repo.find_commit(oid.unwrap()).unwrap().parent_count())
        .collect()
}
