//! Author identity and repository configuration

use std::path::Path;

use git2::Signature;
use serde::{Deserialize, Serialize};
use vault_fs::ConfigStore;

use crate::Result;

/// Identity stamped on every commit made through a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorConfiguration {
    pub name: String,
    pub email: String,
}

impl AuthorConfiguration {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Build a git signature stamped with the current time.
    pub(crate) fn signature(&self) -> std::result::Result<Signature<'static>, git2::Error> {
        Signature::now(&self.name, &self.email)
    }
}

/// Options for [`Repository::get_file_differences`](crate::Repository::get_file_differences).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Unchanged lines shown around each hunk.
    pub context_lines: u32,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { context_lines: 3 }
    }
}

/// Settings for opening a repository, loadable from TOML, JSON or YAML.
///
/// ```toml
/// [author]
/// name = "Planner"
/// email = "planner@example.com"
///
/// [diff]
/// context_lines = 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub author: AuthorConfiguration,
    #[serde(default)]
    pub diff: DiffConfig,
}

impl VaultConfig {
    pub fn new(author: AuthorConfiguration) -> Self {
        Self {
            author,
            diff: DiffConfig::default(),
        }
    }

    /// Load from a file; the format follows the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(ConfigStore::new().load(path.as_ref())?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(ConfigStore::new().save(path.as_ref(), self)?)
    }
}
