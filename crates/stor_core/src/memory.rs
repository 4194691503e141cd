//! In-memory storage.

use crate::backend::{Listing, Meta, Storage};
use crate::config::Config;
use crate::error::{StorageError, StorageResult};
use crate::path::{clean_blob_path, clean_path, join_path, DELIMITER};
use crate::storage_type::StorageType;
use std::collections::BTreeMap;

/// The storage type of [`MemoryStorage`].
pub const MEMORY_STORAGE_TYPE: StorageType = StorageType::from_static("Memory");

/// A storage that keeps every blob in memory.
///
/// This storage is suitable for:
/// - Unit and integration tests
/// - Caches that don't need persistence
///
/// Blobs are copied on save and on load, so neither side ever observes the
/// other mutating a buffer.
///
/// Directories exist only as prefixes of blob paths. As on a file system, a
/// path cannot be a blob and a directory at once: saving `a` while `a/b`
/// exists, or `a/b` while `a` exists, fails with
/// [`StorageError::InvalidPath`].
///
/// # Example
///
/// ```rust
/// use stor_core::{MemoryStorage, Storage};
///
/// let mut storage = MemoryStorage::new();
/// storage.save("a/b", b"x").unwrap();
///
/// let listing = storage.list("a").unwrap();
/// assert_eq!(listing.files, ["a/b"]);
/// assert!(listing.dirs.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    data: BTreeMap<String, Vec<u8>>,
}

impl MemoryStorage {
    /// Creates a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("creating new in-memory storage");
        Self::default()
    }

    /// Registry constructor. The configuration has no effect.
    pub fn from_config(_config: &Config) -> StorageResult<Box<dyn Storage>> {
        Ok(Box::new(Self::new()))
    }

    /// Returns the number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no blobs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Removes every blob.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Rejects saving `clean` where a directory is, or below another blob.
    fn check_blob_target(&self, raw: &str, clean: &str) -> StorageResult<()> {
        let as_dir = format!("{clean}{DELIMITER}");
        let has_children = self
            .data
            .range(as_dir.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&as_dir));
        if has_children {
            return Err(StorageError::invalid_path(raw, "is a directory"));
        }

        for (index, _) in clean.match_indices(DELIMITER) {
            if self.data.contains_key(&clean[..index]) {
                return Err(StorageError::invalid_path(raw, "is below a blob"));
            }
        }
        Ok(())
    }

    fn get(&self, path: &str) -> StorageResult<(String, &[u8])> {
        let clean = clean_path(path)?;
        match self.data.get(&clean) {
            Some(data) => Ok((clean, data.as_slice())),
            None => Err(StorageError::path_does_not_exist(clean)),
        }
    }
}

impl Storage for MemoryStorage {
    fn meta(&self, path: &str) -> StorageResult<Meta> {
        let (_, data) = self.get(path)?;
        Ok(Meta::with_size(data.len() as u64))
    }

    fn list(&self, path: &str) -> StorageResult<Listing> {
        let clean = clean_path(path)?;
        let prefix = if clean.is_empty() {
            clean.clone()
        } else {
            format!("{clean}{DELIMITER}")
        };

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for key in self.data.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once(DELIMITER) {
                None => files.push(join_path(&clean, rest)),
                Some((dir, _)) => dirs.push(join_path(&clean, dir)),
            }
        }

        Ok(Listing::new(files, dirs))
    }

    fn exist(&self, path: &str) -> StorageResult<bool> {
        let clean = clean_path(path)?;
        Ok(self.data.contains_key(&clean))
    }

    fn load(&self, path: &str, max_size: u64) -> StorageResult<Vec<u8>> {
        let (clean, data) = self.get(path)?;
        let size = data.len() as u64;
        if size > max_size {
            return Err(StorageError::TooLarge {
                what: clean,
                size,
                max_size,
            });
        }
        Ok(data.to_vec())
    }

    fn save(&mut self, path: &str, data: &[u8]) -> StorageResult<()> {
        let clean = clean_blob_path(path)?;
        self.check_blob_target(path, &clean)?;
        tracing::debug!(path = %clean, len = data.len(), "MemoryStorage::save");
        self.data.insert(clean, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, path: &str) -> StorageResult<()> {
        let clean = clean_path(path)?;
        if self.data.remove(&clean).is_none() {
            return Err(StorageError::path_does_not_exist(clean));
        }
        tracing::debug!(path = %clean, "MemoryStorage::delete");
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        MEMORY_STORAGE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.save("file1", b"test123").unwrap();
        storage.save("dir1/file2", b"test456").unwrap();
        storage.save("dir1/file3", b"test789").unwrap();
        storage.save("dir1/dir4/file5", b"test788909").unwrap();
        storage.save("dir2/dir3/file4", b"test0123").unwrap();
        storage
    }

    #[test]
    fn memory_new_is_empty() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert!(storage.list("").unwrap().is_empty());
    }

    #[test]
    fn memory_meta_reports_size() {
        let storage = standard();
        assert_eq!(storage.meta("dir1/file3").unwrap(), Meta::with_size(7));
        assert!(storage.meta("dir1/file1").unwrap_err().is_path_does_not_exist());
    }

    #[test]
    fn memory_list_root() {
        let listing = standard().list("").unwrap();
        assert_eq!(listing.files, ["file1"]);
        assert_eq!(listing.dirs, ["dir1", "dir2"]);
    }

    #[test]
    fn memory_list_nested() {
        let listing = standard().list("dir1/").unwrap();
        assert_eq!(listing.files, ["dir1/file2", "dir1/file3"]);
        assert_eq!(listing.dirs, ["dir1/dir4"]);
    }

    #[test]
    fn memory_list_prefix_is_segment_aligned() {
        let mut storage = MemoryStorage::new();
        storage.save("dir/a", b"1").unwrap();
        storage.save("dirx/b", b"2").unwrap();

        let listing = storage.list("dir").unwrap();
        assert_eq!(listing.files, ["dir/a"]);
        assert!(listing.dirs.is_empty());
    }

    #[test]
    fn memory_list_missing_is_empty() {
        assert!(standard().list("nope").unwrap().is_empty());
    }

    #[test]
    fn memory_exist() {
        let storage = standard();
        assert!(storage.exist("dir1/file2").unwrap());
        assert!(storage.exist("./dir1//file2").unwrap());
        assert!(!storage.exist("dir1").unwrap());
        assert!(!storage.exist("missing").unwrap());
    }

    #[test]
    fn memory_load_at_limit_succeeds() {
        let storage = standard();
        assert_eq!(storage.load("file1", 7).unwrap(), b"test123");
    }

    #[test]
    fn memory_load_too_large_fails() {
        let err = standard().load("file1", 6).unwrap_err();
        match err {
            StorageError::TooLarge {
                what,
                size,
                max_size,
            } => {
                assert_eq!(what, "file1");
                assert_eq!(size, 7);
                assert_eq!(max_size, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn memory_load_returns_copy() {
        let mut storage = standard();
        let mut loaded = storage.load("file1", 100).unwrap();
        loaded[0] = b'X';
        assert_eq!(storage.load("file1", 100).unwrap(), b"test123");

        let mut input = b"abc".to_vec();
        storage.save("file1", &input).unwrap();
        input[0] = b'Z';
        assert_eq!(storage.load("file1", 100).unwrap(), b"abc");
    }

    #[test]
    fn memory_save_overwrites() {
        let mut storage = standard();
        storage.save("file1", b"my-data").unwrap();
        assert_eq!(storage.load("file1", 100).unwrap(), b"my-data");
        assert_eq!(storage.len(), 5);
    }

    #[test]
    fn memory_delete_missing_fails() {
        let mut storage = MemoryStorage::new();
        assert!(storage.delete("dir1/file1").unwrap_err().is_path_does_not_exist());
    }

    #[test]
    fn memory_delete_last_file_drops_directory() {
        let mut storage = standard();
        storage.delete("dir2/dir3/file4").unwrap();

        let listing = storage.list("").unwrap();
        assert_eq!(listing.files, ["file1"]);
        assert_eq!(listing.dirs, ["dir1"]);
    }

    #[test]
    fn memory_invalid_path_touches_nothing() {
        let mut storage = standard();
        assert!(storage.save("../x", b"1").unwrap_err().is_invalid_path());
        assert!(storage.delete("/file1").unwrap_err().is_invalid_path());
        assert!(storage.save("", b"1").unwrap_err().is_invalid_path());
        assert_eq!(storage.len(), 5);
    }

    #[test]
    fn memory_blob_and_directory_cannot_share_a_path() {
        let mut storage = standard();

        assert!(storage.save("dir1", b"x").unwrap_err().is_invalid_path());
        assert!(storage.save("file1/nested", b"x").unwrap_err().is_invalid_path());
        assert!(storage.save("file1/a/b", b"x").unwrap_err().is_invalid_path());
        assert_eq!(storage.len(), 5);

        let listing = storage.list("").unwrap();
        assert_eq!(listing.files, ["file1"]);
        assert_eq!(listing.dirs, ["dir1", "dir2"]);
    }

    #[test]
    fn memory_similar_prefixes_are_not_collisions() {
        let mut storage = MemoryStorage::new();
        storage.save("dir/a", b"1").unwrap();
        storage.save("di", b"2").unwrap();
        storage.save("dirx", b"3").unwrap();
        storage.save("dir.b/c", b"4").unwrap();
        assert_eq!(storage.len(), 4);
    }

    #[test]
    fn memory_directory_becomes_free_after_delete() {
        let mut storage = MemoryStorage::new();
        storage.save("a/b", b"1").unwrap();
        storage.delete("a/b").unwrap();
        storage.save("a", b"2").unwrap();
        assert_eq!(storage.load("a", 10).unwrap(), b"2");
    }

    #[test]
    fn memory_clear() {
        let mut storage = standard();
        storage.clear();
        assert!(storage.is_empty());
    }

    #[test]
    fn memory_type() {
        assert_eq!(MemoryStorage::new().storage_type(), MEMORY_STORAGE_TYPE);
    }
}
