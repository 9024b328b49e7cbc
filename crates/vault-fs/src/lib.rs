//! Filesystem primitives for Vault
//!
//! Canonical path resolution, the per-repository lock registry, and safe
//! I/O for configuration files.

pub mod config;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use lock::{LockRegistry, PathLock, PathLockGuard};
pub use path::{NormalizedPath, canonicalize};
