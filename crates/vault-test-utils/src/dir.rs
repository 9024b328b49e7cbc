//! [`TestDir`] scratch directories for vault scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary working directory with helpers for arranging files.
///
/// # Example
///
/// ```rust,no_run
/// use vault_test_utils::TestDir;
///
/// let dir = TestDir::new();
/// dir.write("tasks/today.md", "- plan\n");
/// dir.assert_file_contains("tasks/today.md", "plan");
/// ```
pub struct TestDir {
    temp_dir: TempDir,
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn write(&self, relative: &str, content: &str) {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestDir::write: cannot create {}: {e}", parent.display()));
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("TestDir::write: cannot write {}: {e}", full_path.display()));
    }

    /// Delete the file at `relative`.
    ///
    /// # Panics
    /// Panics if the file cannot be removed.
    pub fn remove(&self, relative: &str) {
        let full_path = self.path(relative);
        fs::remove_file(&full_path)
            .unwrap_or_else(|e| panic!("TestDir::remove: cannot remove {}: {e}", full_path.display()));
    }

    /// Create a symlink named `link` pointing at `target` (both relative).
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, link: &str) -> PathBuf {
        let link_path = self.path(link);
        std::os::unix::fs::symlink(self.path(target), &link_path)
            .unwrap_or_else(|e| panic!("TestDir::symlink: {e}"));
        link_path
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let full_path = self.path(relative);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
