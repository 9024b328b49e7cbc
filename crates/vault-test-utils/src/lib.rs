//! Shared test utilities for the vault workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: independent readers of on-disk git state, used to check what
//!   the vault wrote without going through its own API
//! - [`dir`]: [`TestDir`] scratch working directories with file helpers

pub mod dir;
pub mod git;

pub use dir::TestDir;
