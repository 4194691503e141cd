//! Storage configuration.

use crate::error::{StorageError, StorageResult};
use crate::storage_type::StorageType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for constructing a storage through a [`Registry`](crate::Registry).
///
/// As JSON:
///
/// ```json
/// { "type": "LocalDir", "path": "./data" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Which storage implementation to construct.
    #[serde(rename = "type", default)]
    pub storage_type: StorageType,

    /// Substrate location. The base directory for a local directory storage;
    /// ignored by storages that have no location.
    #[serde(default)]
    pub path: PathBuf,
}

impl Config {
    /// Creates a new configuration with an unspecified type and empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage type.
    #[must_use]
    pub fn storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    /// Sets the substrate path.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidConfig`] if the document is malformed.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json).map_err(|e| StorageError::InvalidConfig {
            message: e.to_string(),
        })
    }
}
