//! Model-based integration test helpers.
//!
//! [`StorageHarness`] drives any [`Storage`] alongside a plain map of the
//! blobs it should hold, and checks every result against that model.

use crate::generators::StorageOperation;
use std::collections::BTreeMap;
use stor_core::{join_path, Listing, Storage};

/// Load limit used by the harness; larger than any generated blob.
const MAX_SIZE: u64 = 1 << 20;

/// A test harness pairing a storage with the model of its contents.
pub struct StorageHarness {
    /// The storage under test.
    pub storage: Box<dyn Storage>,
    /// Blob tracking for verification.
    blobs: BTreeMap<String, Vec<u8>>,
}

impl StorageHarness {
    /// Creates a harness around an empty storage.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            blobs: BTreeMap::new(),
        }
    }

    /// Saves a blob and tracks it for later verification.
    ///
    /// A path that collides with an existing blob in its directory structure
    /// (a blob where a directory is, or below another blob) must be refused
    /// as invalid. Any other path must save.
    pub fn save(&mut self, path: &str, data: &[u8]) {
        let result = self.storage.save(path, data);
        if self.collides(path) {
            let err = result.expect_err("Saved a blob colliding with the directory structure");
            assert!(err.is_invalid_path(), "Unexpected error for {path}: {err}");
            return;
        }

        result.unwrap_or_else(|e| panic!("Failed to save {path}: {e}"));
        self.blobs.insert(path.to_string(), data.to_vec());
    }

    /// Loads a blob and verifies it matches the tracked value.
    pub fn load_and_verify(&self, path: &str) -> Option<Vec<u8>> {
        match (self.storage.load(path, MAX_SIZE), self.blobs.get(path)) {
            (Ok(actual), Some(expected)) => {
                assert_eq!(&actual, expected, "Blob data mismatch for {path}");
                Some(actual)
            }
            (Ok(_), None) => panic!("Loaded {path}, which was never saved or was deleted"),
            (Err(e), Some(_)) => panic!("Failed to load {path}: {e}"),
            (Err(e), None) => {
                assert!(e.is_path_does_not_exist(), "Unexpected error for {path}: {e}");
                None
            }
        }
    }

    /// Deletes a blob and updates tracking.
    pub fn delete(&mut self, path: &str) {
        let result = self.storage.delete(path);
        if self.blobs.remove(path).is_some() {
            result.unwrap_or_else(|e| panic!("Failed to delete {path}: {e}"));
        } else {
            let err = result.expect_err("Deleted a blob that doesn't exist");
            assert!(err.is_path_does_not_exist(), "Unexpected error for {path}: {err}");
        }
    }

    /// Applies one operation.
    pub fn apply(&mut self, op: &StorageOperation) {
        match op {
            StorageOperation::Save { path, data } => self.save(path, data),
            StorageOperation::Delete { path } => self.delete(path),
            StorageOperation::Load { path } => {
                self.load_and_verify(path);
            }
        }
    }

    /// Applies a sequence of operations, then verifies the whole storage.
    pub fn apply_all(&mut self, ops: &[StorageOperation]) {
        for op in ops {
            self.apply(op);
        }
        self.verify_all();
    }

    /// Verifies all tracked blobs load back and every directory lists
    /// exactly what the model holds.
    pub fn verify_all(&self) {
        for (path, expected) in &self.blobs {
            let actual = self
                .storage
                .load(path, MAX_SIZE)
                .unwrap_or_else(|e| panic!("Failed to load {path}: {e}"));
            assert_eq!(&actual, expected, "Blob data mismatch for {path}");
            assert!(
                self.storage.exist(path).unwrap_or(false),
                "{path} should exist"
            );
        }

        self.verify_listing("");
    }

    fn verify_listing(&self, dir: &str) {
        let expected = self.expected_listing(dir);
        let actual = self
            .storage
            .list(dir)
            .unwrap_or_else(|e| panic!("Failed to list {dir:?}: {e}"));
        assert_eq!(actual, expected, "Listing mismatch for {dir:?}");

        for sub_dir in &expected.dirs {
            self.verify_listing(sub_dir);
        }
    }

    /// Computes what listing `dir` should return from the tracked blobs.
    pub fn expected_listing(&self, dir: &str) -> Listing {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for path in self.blobs.keys() {
            if let Some(rest) = path.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    None => files.push(join_path(dir, rest)),
                    Some((name, _)) => dirs.push(join_path(dir, name)),
                }
            }
        }
        Listing::new(files, dirs)
    }

    /// Returns the count of tracked blobs.
    pub fn tracked_count(&self) -> usize {
        self.blobs.len()
    }

    fn collides(&self, path: &str) -> bool {
        let as_dir = format!("{path}/");
        self.blobs.keys().any(|existing| {
            existing.starts_with(&as_dir) || path.starts_with(&format!("{existing}/"))
        })
    }
}
