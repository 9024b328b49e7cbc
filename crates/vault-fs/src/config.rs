//! Format-agnostic configuration loading and saving

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, io};

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension and handles
/// serialization/deserialization transparently.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = io::read_text(path)?;
        let parse_err = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension_of(path).as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_err("TOML", e.to_string())),
            "json" => {
                serde_json::from_str(&content).map_err(|e| parse_err("JSON", e.to_string()))
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_err("YAML", e.to_string()))
            }
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    /// Save configuration to a file atomically.
    ///
    /// Format is determined from file extension.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let serialize_err = |format: &str, message: String| Error::ConfigSerialize {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        let content = match extension_of(path).as_str() {
            "toml" => {
                toml::to_string_pretty(value).map_err(|e| serialize_err("TOML", e.to_string()))?
            }
            "json" => serde_json::to_string_pretty(value)
                .map_err(|e| serialize_err("JSON", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::to_string(value).map_err(|e| serialize_err("YAML", e.to_string()))?
            }
            other => {
                return Err(Error::UnsupportedFormat {
                    extension: other.to_string(),
                });
            }
        };

        tracing::debug!(path = %path.display(), "Saving config");
        io::write_atomic(path, content.as_bytes())
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
