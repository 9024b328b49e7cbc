//! Unified diffs between two commits

use git2::{Commit, DiffFormat, DiffOptions, Repository};

use crate::{DiffConfig, Error, Result};

/// Resolve a revision (full or abbreviated hash, or any revspec) to a commit.
pub(crate) fn resolve_commit<'r>(repo: &'r Repository, reference: &str) -> Result<Commit<'r>> {
    let query_err = |e: git2::Error| Error::HistoryQuery {
        reference: reference.to_string(),
        message: e.message().to_string(),
    };

    repo.revparse_single(reference)
        .and_then(|object| object.peel_to_commit())
        .map_err(query_err)
}

/// Render every file change between `from` and `to` as a unified diff.
///
/// The output follows `git diff` patch format: `diff --git` and `---`/`+++`
/// file headers, `@@` hunk headers, and lines prefixed with `+`, `-` or a
/// space.
pub fn file_differences(
    repo: &Repository,
    from: &str,
    to: &str,
    config: DiffConfig,
) -> Result<Vec<u8>> {
    let old_tree = resolve_commit(repo, from)?.tree()?;
    let new_tree = resolve_commit(repo, to)?.tree()?;

    let mut opts = DiffOptions::new();
    opts.context_lines(config.context_lines);
    let diff = repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))?;

    let mut patch = Vec::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            patch.push(line.origin() as u8);
        }
        patch.extend_from_slice(line.content());
        true
    })?;

    tracing::debug!(from, to, bytes = patch.len(), "Rendered diff");
    Ok(patch)
}
