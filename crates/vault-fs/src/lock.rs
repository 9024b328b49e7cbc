//! Per-repository lock registry
//!
//! Serializes writers per canonical repository path without serializing
//! unrelated repositories. Keys are produced by [`canonicalize`], so a
//! directory reached directly and through a symlink shares one lock.
//!
//! Entries are created lazily and live for the rest of the process; the map
//! grows with the number of distinct repositories, not with operation count.
//!
//! # Example
//!
//! ```no_run
//! use vault_fs::LockRegistry;
//!
//! let registry = LockRegistry::new();
//! let guard = registry.acquire("/data/planner")?;
//! // ... exclusive section ...
//! drop(guard);
//! # Ok::<(), vault_fs::Error>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, LazyLock, Mutex, PoisonError};

use crate::{Result, canonicalize};

static GLOBAL: LazyLock<Arc<LockRegistry>> = LazyLock::new(|| Arc::new(LockRegistry::new()));

/// Map from canonical repository path to its lock.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<PathLock>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by every handle that does not bring
    /// its own.
    pub fn global() -> Arc<LockRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Get (or lazily create) the lock for the directory at `path`.
    ///
    /// The directory must exist, since the key is its canonical form.
    pub fn lock_for(&self, path: impl AsRef<Path>) -> Result<Arc<PathLock>> {
        let key = canonicalize(path)?;
        let mut locks = recover(self.locks.lock());
        let lock = locks
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::debug!(path = %key.display(), "Registering repository lock");
                Arc::new(PathLock::new(key))
            })
            .clone();
        Ok(lock)
    }

    /// Block until the lock for `path` is free, then take it.
    pub fn acquire(&self, path: impl AsRef<Path>) -> Result<PathLockGuard> {
        Ok(self.lock_for(path)?.acquire())
    }

    /// Take the lock for `path` only if nobody holds it.
    pub fn try_acquire(&self, path: impl AsRef<Path>) -> Result<Option<PathLockGuard>> {
        Ok(self.lock_for(path)?.try_acquire())
    }

    /// Number of distinct canonical paths seen so far.
    pub fn len(&self) -> usize {
        recover(self.locks.lock()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An exclusive, non-reentrant lock keyed by one canonical path.
///
/// Unlike a plain mutex guard, the [`PathLockGuard`] owns an `Arc` to the
/// lock, so it can be stored in long-lived values and moved across threads.
#[derive(Debug)]
pub struct PathLock {
    key: PathBuf,
    held: Mutex<bool>,
    released: Condvar,
}

impl PathLock {
    fn new(key: PathBuf) -> Self {
        Self {
            key,
            held: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    /// The canonical path this lock guards.
    pub fn key(&self) -> &Path {
        &self.key
    }

    pub fn is_held(&self) -> bool {
        *recover(self.held.lock())
    }

    /// Block until the lock is free, then take it. No timeout.
    pub fn acquire(self: Arc<Self>) -> PathLockGuard {
        let mut held = recover(self.held.lock());
        while *held {
            held = recover(self.released.wait(held));
        }
        *held = true;
        drop(held);

        tracing::trace!(path = %self.key.display(), "Acquired repository lock");
        PathLockGuard { lock: self }
    }

    pub fn try_acquire(self: Arc<Self>) -> Option<PathLockGuard> {
        let mut held = recover(self.held.lock());
        if *held {
            return None;
        }
        *held = true;
        drop(held);
        Some(PathLockGuard { lock: self })
    }

    fn release(&self) {
        let mut held = recover(self.held.lock());
        *held = false;
        drop(held);
        self.released.notify_one();
        tracing::trace!(path = %self.key.display(), "Released repository lock");
    }
}

/// Proof of exclusive access to one repository; releases on drop.
#[derive(Debug)]
pub struct PathLockGuard {
    lock: Arc<PathLock>,
}

impl PathLockGuard {
    pub fn key(&self) -> &Path {
        self.lock.key()
    }
}

impl Drop for PathLockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}

// The protected state is a flag or a map of Arcs; neither can be left
// half-updated by a panicking holder.
fn recover<G>(result: std::result::Result<G, PoisonError<G>>) -> G {
    result.unwrap_or_else(PoisonError::into_inner)
}
