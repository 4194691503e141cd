//! Test fixtures and storage helpers.
//!
//! Provides scratch storages and a standard set of blobs shared by the
//! conformance suite and ad-hoc tests.

use stor_core::{Config, LocalDir, MemoryStorage, Storage, LOCAL_DIR_STORAGE_TYPE};
use std::path::Path;
use tempfile::TempDir;

/// The standard blobs, as `(path, content)` pairs.
///
/// Layout:
///
/// ```text
/// file1
/// dir1/file2
/// dir1/file3
/// dir1/dir4/file5
/// dir2/dir3/file4
/// ```
pub const STANDARD_FILES: &[(&str, &str)] = &[
    ("file1", "test123"),
    ("dir1/file2", "test456"),
    ("dir1/file3", "test789"),
    ("dir1/dir4/file5", "test788909"),
    ("dir2/dir3/file4", "test0123"),
];

/// Saves every entry of [`STANDARD_FILES`] into `storage`.
///
/// # Panics
///
/// Panics if a save fails.
pub fn insert_standard_files(storage: &mut dyn Storage) {
    for (path, content) in STANDARD_FILES {
        storage
            .save(path, content.as_bytes())
            .unwrap_or_else(|e| panic!("failed to insert standard file {path}: {e}"));
    }
}

/// A local directory storage in a temporary directory, removed on drop.
pub struct TempLocalDir {
    /// The storage under test.
    pub storage: LocalDir,
    /// The temporary directory (kept alive to prevent cleanup).
    dir: TempDir,
}

impl TempLocalDir {
    /// Creates a storage on a fresh temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let storage = LocalDir::open(dir.path()).expect("Failed to open local dir storage");
        Self { storage, dir }
    }

    /// Returns the base directory on disk.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns a configuration selecting this directory.
    pub fn config(&self) -> Config {
        Config::new()
            .storage_type(LOCAL_DIR_STORAGE_TYPE)
            .path(self.dir.path())
    }

    /// Removes everything below the base directory, keeping the directory.
    pub fn clear(&self) {
        for entry in std::fs::read_dir(self.dir.path()).expect("Failed to list temp directory") {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                std::fs::remove_dir_all(&path).expect("Failed to remove directory");
            } else {
                std::fs::remove_file(&path).expect("Failed to remove file");
            }
        }
    }
}

impl Default for TempLocalDir {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TempLocalDir {
    type Target = LocalDir;

    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

impl std::ops::DerefMut for TempLocalDir {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.storage
    }
}

/// Runs a test with a temporary local directory storage.
///
/// # Example
///
/// ```rust
/// use stor_core::Storage;
/// use stor_testkit::with_temp_local_dir;
///
/// with_temp_local_dir(|storage, base| {
///     storage.save("a/b", b"x").unwrap();
///     assert!(base.join("a").join("b").is_file());
/// });
/// ```
pub fn with_temp_local_dir<F, R>(f: F) -> R
where
    F: FnOnce(&mut LocalDir, &Path) -> R,
{
    let mut temp = TempLocalDir::new();
    let base = temp.path().to_path_buf();
    f(&mut temp.storage, &base)
}

/// Runs a test with a memory storage preloaded with [`STANDARD_FILES`].
pub fn with_standard_memory<F, R>(f: F) -> R
where
    F: FnOnce(&mut MemoryStorage) -> R,
{
    let mut storage = MemoryStorage::new();
    insert_standard_files(&mut storage);
    f(&mut storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_files_land_on_disk() {
        let mut temp = TempLocalDir::new();
        insert_standard_files(&mut *temp);

        for (path, content) in STANDARD_FILES {
            let on_disk = std::fs::read(temp.path().join(path)).unwrap();
            assert_eq!(on_disk, content.as_bytes());
        }
    }

    #[test]
    fn clear_keeps_base_dir() {
        let mut temp = TempLocalDir::new();
        insert_standard_files(&mut *temp);
        temp.clear();

        assert!(temp.path().is_dir());
        assert!(temp.list("").unwrap().is_empty());
    }

    #[test]
    fn standard_memory_has_all_files() {
        with_standard_memory(|storage| {
            assert_eq!(storage.len(), STANDARD_FILES.len());
        });
    }
}
