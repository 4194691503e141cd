//! Storage trait definition.

use crate::error::StorageResult;
use crate::storage_type::StorageType;

/// Meta information about a stored blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Meta {
    /// Size in bytes, or `None` if the backend cannot tell.
    pub size: Option<u64>,
}

impl Meta {
    /// Meta information for a blob of known size.
    #[must_use]
    pub const fn with_size(size: u64) -> Self {
        Self { size: Some(size) }
    }

    /// Meta information for a blob of unknown size.
    #[must_use]
    pub const fn unknown() -> Self {
        Self { size: None }
    }
}

/// The entries of a storage directory.
///
/// Entries are full paths relative to the storage root, sorted and free of
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Blobs directly inside the directory.
    pub files: Vec<String>,
    /// Subdirectories directly inside the directory.
    pub dirs: Vec<String>,
}

impl Listing {
    /// Builds a listing, sorting and deduplicating both sides.
    #[must_use]
    pub fn new(mut files: Vec<String>, mut dirs: Vec<String>) -> Self {
        files.sort_unstable();
        files.dedup();
        dirs.sort_unstable();
        dirs.dedup();
        Self { files, dirs }
    }

    /// Returns true if the directory has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

/// A blob store addressed by slash-separated relative paths.
///
/// Storages are **opaque byte stores**: they load and save whole blobs and
/// do not interpret the bytes. Every operation first sanitizes its path with
/// [`crate::clean_path`]; an invalid path fails with
/// [`crate::StorageError::InvalidPath`] before the substrate is touched.
///
/// # Invariants
///
/// - `load` after `save` returns exactly the saved bytes
/// - after a successful `delete`, `exist` is false and the path no longer
///   appears in the `list` of its parent
/// - operations that fail leave the stored state unchanged
///
/// Mutating operations take `&mut self`; callers sharing one storage across
/// threads provide their own synchronization.
///
/// # Implementors
///
/// - [`super::MemoryStorage`] - volatile, for caching and tests
/// - [`super::LocalDir`] - files below a local base directory
pub trait Storage: Send + Sync {
    /// Returns meta information about the blob at `path`.
    ///
    /// # Errors
    ///
    /// Returns `PathDoesNotExist` if there is no blob at `path`.
    fn meta(&self, path: &str) -> StorageResult<Meta>;

    /// Lists the blobs and subdirectories directly inside `path`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for a rejected path, or a substrate error.
    fn list(&self, path: &str) -> StorageResult<Listing>;

    /// Checks whether a blob exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for a rejected path, or a substrate error.
    fn exist(&self, path: &str) -> StorageResult<bool>;

    /// Loads the blob at `path`.
    ///
    /// Blobs larger than `max_size` are not read at all.
    ///
    /// # Errors
    ///
    /// Returns `PathDoesNotExist` if there is no blob at `path` and
    /// `TooLarge` if it is larger than `max_size`.
    fn load(&self, path: &str, max_size: u64) -> StorageResult<Vec<u8>>;

    /// Saves `data` at `path`, replacing any existing blob.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for a rejected path, or a substrate error.
    fn save(&mut self, path: &str, data: &[u8]) -> StorageResult<()>;

    /// Deletes the blob at `path`.
    ///
    /// # Errors
    ///
    /// Returns `PathDoesNotExist` if there is no blob at `path`.
    fn delete(&mut self, path: &str) -> StorageResult<()>;

    /// Returns the type of this storage.
    fn storage_type(&self) -> StorageType;
}
