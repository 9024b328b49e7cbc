//! Path handling: canonical lock keys and normalized repository-relative paths

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Resolve `path` to its real absolute form with every symlink followed.
///
/// Two paths reaching the same directory (directly or through a symlink)
/// resolve to the same value. On Windows the result avoids the `\\?\`
/// prefix where possible so it stays comparable with user-supplied paths.
pub fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    dunce::canonicalize(path).map_err(|source| Error::Canonicalize {
        path: path.to_path_buf(),
        source,
    })
}

/// A path normalized to forward slashes with `.` and `..` resolved lexically.
///
/// Used for repository-relative file paths and staging patterns, which git
/// always stores with `/` separators. Normalization never touches the
/// filesystem, so wildcard characters pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Backslashes become forward slashes, empty and `.` components are
    /// dropped, and `..` pops the previous component. A `..` with nothing
    /// left to pop is discarded, so the result never escapes its root.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let absolute = raw.starts_with('/');

        let mut parts: Vec<&str> = Vec::new();
        for component in raw.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }

        let joined = parts.join("/");
        let inner = if absolute {
            format!("/{joined}")
        } else {
            joined
        };
        Self { inner }
    }

    /// Whether some `..` in `path` has no component left to pop, meaning the
    /// path points above whatever root it is resolved against.
    ///
    /// [`new`](Self::new) silently drops such components, so callers that
    /// must stay inside a root check this first.
    pub fn escapes_root(path: impl AsRef<Path>) -> bool {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let mut depth = 0usize;
        for component in raw.split('/') {
            match component {
                "" | "." => {}
                ".." => match depth.checked_sub(1) {
                    Some(parent) => depth = parent,
                    None => return true,
                },
                _ => depth += 1,
            }
        }
        false
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// The path with any leading `/` removed.
    ///
    /// Repository-relative lookups treat `/notes.md` and `notes.md` alike.
    pub fn as_relative(&self) -> &str {
        self.inner.trim_start_matches('/')
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment, normalizing the result.
    pub fn join(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.inner, segment))
    }

    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
    }

    /// True for the empty relative path (the input was `.`, `./` or empty).
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
