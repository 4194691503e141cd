//! CLI command implementations.

pub mod blob;
pub mod list;
pub mod types;

use std::fs;
use std::path::PathBuf;
use stor_core::{Config, Registry, Storage, StorageType};
use tracing::debug;

/// Default load limit for `cat`.
pub const DEFAULT_MAX_SIZE: u64 = 64 * 1024 * 1024;

/// Global options selecting the storage to operate on.
#[derive(Debug, Default)]
pub struct StorageArgs {
    /// Storage type from `--type`.
    pub storage_type: Option<String>,
    /// Base path from `--path`.
    pub path: Option<PathBuf>,
    /// Configuration file from `--config`.
    pub config: Option<PathBuf>,
}

impl StorageArgs {
    /// Builds the configuration: the file first, then command-line overrides.
    pub fn resolve_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(file) => {
                debug!("Reading configuration from {:?}", file);
                Config::from_json(&fs::read_to_string(file)?)?
            }
            None => Config::new(),
        };

        if let Some(storage_type) = &self.storage_type {
            config = config.storage_type(StorageType::new(storage_type.as_str()));
        }
        if let Some(path) = &self.path {
            config = config.path(path);
        }

        Ok(config)
    }

    /// Constructs the selected storage with the built-in registry.
    pub fn open(&self) -> Result<Box<dyn Storage>, Box<dyn std::error::Error>> {
        let config = self.resolve_config()?;
        debug!(
            "Opening {} storage at {:?}",
            config.storage_type, config.path
        );
        Ok(Registry::with_builtin().construct(&config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stor_core::{LOCAL_DIR_STORAGE_TYPE, MEMORY_STORAGE_TYPE};

    #[test]
    fn flags_only() {
        let args = StorageArgs {
            storage_type: Some("Memory".into()),
            ..StorageArgs::default()
        };
        let config = args.resolve_config().unwrap();
        assert_eq!(config.storage_type, MEMORY_STORAGE_TYPE);
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("stor.json");
        fs::write(&file, r#"{"type": "Memory", "path": "from-file"}"#).unwrap();

        let args = StorageArgs {
            storage_type: Some("LocalDir".into()),
            path: None,
            config: Some(file),
        };
        let config = args.resolve_config().unwrap();
        assert_eq!(config.storage_type, LOCAL_DIR_STORAGE_TYPE);
        assert_eq!(config.path, PathBuf::from("from-file"));
    }

    #[test]
    fn missing_type_fails() {
        let err = StorageArgs::default().open().err().expect("expected error");
        let err = err.downcast_ref::<stor_core::StorageError>().unwrap();
        assert!(err.is_unspecified_type());
    }

    #[test]
    fn unknown_type_fails() {
        let args = StorageArgs {
            storage_type: Some("Tape".into()),
            ..StorageArgs::default()
        };
        let err = args.open().err().expect("expected error");
        let err = err.downcast_ref::<stor_core::StorageError>().unwrap();
        assert!(err.is_unregistered_type());
    }

    #[test]
    fn opens_local_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = StorageArgs {
            storage_type: Some("LocalDir".into()),
            path: Some(dir.path().to_path_buf()),
            config: None,
        };
        let storage = args.open().unwrap();
        assert_eq!(storage.storage_type(), LOCAL_DIR_STORAGE_TYPE);
    }
}
