//! Storage type registry and factory.

use crate::backend::Storage;
use crate::config::Config;
use crate::error::{StorageError, StorageResult};
use crate::local_dir::{LocalDir, LOCAL_DIR_STORAGE_TYPE};
use crate::memory::{MemoryStorage, MEMORY_STORAGE_TYPE};
use crate::storage_type::{StorageType, MAX_TYPE_LEN};
use std::collections::HashMap;
use std::fmt;

/// Builds a storage from a configuration.
pub type Constructor = Box<dyn Fn(&Config) -> StorageResult<Box<dyn Storage>> + Send + Sync>;

/// Maps storage types to the constructors that build them.
///
/// A registry is populated once while the application is wired together and
/// read-only afterwards. Misconfiguring it (an unspecified, overlong or
/// duplicate type) is a programming error and panics; looking up a type from
/// runtime configuration is an ordinary recoverable error.
///
/// # Example
///
/// ```rust
/// use stor_core::{Config, Registry, MEMORY_STORAGE_TYPE};
///
/// let registry = Registry::with_builtin();
/// let mut storage = registry
///     .construct(&Config::new().storage_type(MEMORY_STORAGE_TYPE))
///     .unwrap();
/// storage.save("hello", b"world").unwrap();
/// ```
#[derive(Default)]
pub struct Registry {
    constructors: HashMap<StorageType, Constructor>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every storage this crate provides.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(MEMORY_STORAGE_TYPE, MemoryStorage::from_config);
        registry.register(LOCAL_DIR_STORAGE_TYPE, LocalDir::from_config);
        registry
    }

    /// Registers the constructor for a storage type.
    ///
    /// # Panics
    ///
    /// Panics if `storage_type` is unspecified, longer than
    /// [`MAX_TYPE_LEN`] bytes, or already registered.
    pub fn register<F>(&mut self, storage_type: StorageType, constructor: F)
    where
        F: Fn(&Config) -> StorageResult<Box<dyn Storage>> + Send + Sync + 'static,
    {
        assert!(
            !storage_type.is_unspecified(),
            "cannot register the unspecified storage type"
        );
        assert!(
            storage_type.len() <= MAX_TYPE_LEN,
            "storage type {storage_type} is longer than {MAX_TYPE_LEN} bytes"
        );
        assert!(
            !self.constructors.contains_key(&storage_type),
            "storage type {storage_type} is already registered"
        );

        tracing::debug!(%storage_type, "registered storage type");
        self.constructors.insert(storage_type, Box::new(constructor));
    }

    /// Returns true if `storage_type` has a constructor.
    #[must_use]
    pub fn is_registered(&self, storage_type: &StorageType) -> bool {
        self.constructors.contains_key(storage_type)
    }

    /// Returns the registered types, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<StorageType> {
        let mut types: Vec<_> = self.constructors.keys().cloned().collect();
        types.sort();
        types
    }

    /// Constructs the storage selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnspecifiedType`] if the configuration names no
    /// type, [`StorageError::UnregisteredType`] if nobody registered it, and
    /// otherwise whatever the constructor returns.
    pub fn construct(&self, config: &Config) -> StorageResult<Box<dyn Storage>> {
        if config.storage_type.is_unspecified() {
            return Err(StorageError::UnspecifiedType);
        }

        let constructor = self.constructors.get(&config.storage_type).ok_or_else(|| {
            StorageError::UnregisteredType {
                storage_type: config.storage_type.clone(),
            }
        })?;

        tracing::debug!(storage_type = %config.storage_type, path = %config.path.display(), "constructing storage");
        constructor(config)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.registered_types())
            .finish()
    }
}
