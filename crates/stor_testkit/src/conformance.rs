//! Storage conformance suite.
//!
//! Every [`Storage`] implementation must pass these checks. Each check gets
//! a fresh, empty storage from the caller's factory.
//!
//! ## Usage
//!
//! ```rust
//! use stor_core::MemoryStorage;
//! use stor_testkit::conformance::{self, Fixture};
//!
//! conformance::run_all(|| Fixture::new(Box::new(MemoryStorage::new())));
//! ```

use crate::fixtures::insert_standard_files;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use stor_core::{Listing, Meta, Storage};
use tempfile::TempDir;

/// Generous load limit for checks that don't test size enforcement.
const MAX_SIZE: u64 = 1_000_000;

/// A storage under test, plus whatever must outlive it.
pub struct Fixture {
    storage: Box<dyn Storage>,
    _temp_dir: Option<TempDir>,
}

impl Fixture {
    /// Wraps a storage that needs no scratch space.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            _temp_dir: None,
        }
    }

    /// Wraps a storage that lives in `temp_dir`, which is removed when the
    /// fixture is dropped.
    pub fn with_temp_dir(storage: Box<dyn Storage>, temp_dir: TempDir) -> Self {
        Self {
            storage,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the storage under test.
    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        self.storage.as_mut()
    }
}

/// A single conformance check.
pub type Check = fn(&mut dyn Storage);

/// All checks, by name.
pub const CHECKS: &[(&str, Check)] = &[
    ("meta", check_meta),
    ("meta_escapes", check_meta_escapes),
    ("meta_non_existing", check_meta_non_existing),
    ("list", check_list),
    ("list_escapes", check_list_escapes),
    ("list_dot", check_list_dot),
    ("list_dir1", check_list_dir1),
    ("exist", check_exist),
    ("load", check_load),
    ("load_escapes", check_load_escapes),
    ("load_in_dir", check_load_in_dir),
    ("load_with_max_size", check_load_with_max_size),
    ("load_at_max_size", check_load_at_max_size),
    ("load_non_existing", check_load_non_existing),
    ("save", check_save),
    ("save_overwrite", check_save_overwrite),
    ("save_escapes", check_save_escapes),
    ("save_sloppy_path", check_save_sloppy_path),
    ("save_collisions", check_save_collisions),
    ("delete", check_delete),
    ("delete_dir", check_delete_dir),
    ("delete_non_existing", check_delete_non_existing),
    ("delete_all", check_delete_all),
    ("delete_escapes", check_delete_escapes),
    ("rejected_paths_change_nothing", check_rejected_paths_change_nothing),
];

/// Runs every check in [`CHECKS`] against fresh storages from `factory`.
///
/// # Panics
///
/// Panics after all checks ran if any of them failed, naming each failure.
pub fn run_all<F>(mut factory: F)
where
    F: FnMut() -> Fixture,
{
    let mut failures = Vec::new();

    for (name, check) in CHECKS {
        let mut fixture = factory();
        let result = panic::catch_unwind(AssertUnwindSafe(|| check(fixture.storage_mut())));
        if let Err(payload) = result {
            failures.push(format!("{name}: {}", panic_message(payload.as_ref())));
        }
    }

    assert!(
        failures.is_empty(),
        "{} conformance check(s) failed:\n  {}",
        failures.len(),
        failures.join("\n  ")
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else {
        "<non-string panic>"
    }
}

fn listing(files: &[&str], dirs: &[&str]) -> Listing {
    Listing::new(
        files.iter().map(|s| (*s).to_string()).collect(),
        dirs.iter().map(|s| (*s).to_string()).collect(),
    )
}

/// Meta returns the size of a blob.
pub fn check_meta(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let meta = storage.meta("dir1/file3").expect("meta failed");
    assert_eq!(meta, Meta::with_size(7));
}

/// Meta rejects paths that escape the root.
pub fn check_meta_escapes(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage.meta("../file1").expect_err("meta accepted ../file1");
    assert!(err.is_invalid_path(), "unexpected error: {err}");
}

/// Meta reports missing blobs.
pub fn check_meta_non_existing(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage.meta("dir1/file1").expect_err("meta found dir1/file1");
    assert!(err.is_path_does_not_exist(), "unexpected error: {err}");
}

/// List of the root returns top-level files and directories.
pub fn check_list(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let result = storage.list("").expect("list failed");
    assert_eq!(result, listing(&["file1"], &["dir1", "dir2"]));
}

/// List rejects paths that escape the root.
pub fn check_list_escapes(storage: &mut dyn Storage) {
    let err = storage.list("..").expect_err("list accepted ..");
    assert!(err.is_invalid_path(), "unexpected error: {err}");
}

/// `.` denotes the root.
pub fn check_list_dot(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let result = storage.list(".").expect("list failed");
    assert_eq!(result, listing(&["file1"], &["dir1", "dir2"]));
}

/// List of a directory returns full paths of its children.
pub fn check_list_dir1(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let result = storage.list("dir1").expect("list failed");
    assert_eq!(
        result,
        listing(&["dir1/file2", "dir1/file3"], &["dir1/dir4"])
    );
}

/// Exist is true for blobs only.
pub fn check_exist(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    assert!(storage.exist("dir1/file2").expect("exist failed"));
    assert!(!storage.exist("dir1/file1").expect("exist failed"));
    assert!(!storage.exist("dir1").expect("exist failed"));

    let err = storage.exist("../file1").expect_err("exist accepted ../file1");
    assert!(err.is_invalid_path(), "unexpected error: {err}");
}

/// Load returns the content of a blob.
pub fn check_load(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let data = storage.load("file1", MAX_SIZE).expect("load failed");
    assert_eq!(data, b"test123");
}

/// Load rejects paths that escape the root.
pub fn check_load_escapes(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage
        .load("../file1", MAX_SIZE)
        .expect_err("load accepted ../file1");
    assert!(err.is_invalid_path(), "unexpected error: {err}");
}

/// Load finds blobs in directories.
pub fn check_load_in_dir(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let data = storage.load("dir1/file2", MAX_SIZE).expect("load failed");
    assert_eq!(data, b"test456");
}

/// Load refuses blobs larger than the limit.
pub fn check_load_with_max_size(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage.load("file1", 6).expect_err("load ignored max size");
    assert!(err.is_too_large(), "unexpected error: {err}");
}

/// A blob exactly at the limit loads.
pub fn check_load_at_max_size(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let data = storage.load("file1", 7).expect("load failed at limit");
    assert_eq!(data, b"test123");
}

/// Load reports missing blobs.
pub fn check_load_non_existing(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage
        .load("dir1/file1", MAX_SIZE)
        .expect_err("load found dir1/file1");
    assert!(err.is_path_does_not_exist(), "unexpected error: {err}");
}

/// Save stores a new blob.
pub fn check_save(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    storage
        .save("dir1/new-file.txt", b"my-data")
        .expect("save failed");
    let data = storage
        .load("dir1/new-file.txt", MAX_SIZE)
        .expect("load failed");
    assert_eq!(data, b"my-data");
}

/// Save replaces an existing blob.
pub fn check_save_overwrite(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    storage.save("file1", b"my-data").expect("save failed");
    let data = storage.load("file1", MAX_SIZE).expect("load failed");
    assert_eq!(data, b"my-data");
}

/// Save rejects paths that escape the root.
pub fn check_save_escapes(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage
        .save("../file1", b"qwerty")
        .expect_err("save accepted ../file1");
    assert!(err.is_invalid_path(), "unexpected error: {err}");
}

/// A sloppily written path addresses the same blob as its canonical form.
pub fn check_save_sloppy_path(storage: &mut dyn Storage) {
    storage.save("./dir5//file6/", b"sloppy").expect("save failed");

    let data = storage.load("dir5/file6", MAX_SIZE).expect("load failed");
    assert_eq!(data, b"sloppy");
    assert_eq!(
        storage.list("dir5").expect("list failed"),
        listing(&["dir5/file6"], &[])
    );
}

/// A path is never a blob and a directory at once.
pub fn check_save_collisions(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage
        .save("dir1", b"x")
        .expect_err("save replaced directory dir1");
    assert!(err.is_invalid_path(), "unexpected error: {err}");
    let err = storage
        .save("file1/file6", b"x")
        .expect_err("save nested below blob file1");
    assert!(err.is_invalid_path(), "unexpected error: {err}");

    assert_eq!(
        storage.list("").expect("list failed"),
        listing(&["file1"], &["dir1", "dir2"])
    );
    let data = storage.load("file1", MAX_SIZE).expect("load failed");
    assert_eq!(data, b"test123");
}

/// Delete removes a blob from its directory.
pub fn check_delete(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    storage.delete("dir1/file2").expect("delete failed");
    assert!(storage.load("dir1/file2", MAX_SIZE).is_err());
    assert!(!storage.exist("dir1/file2").expect("exist failed"));

    let result = storage.list("dir1").expect("list failed");
    assert_eq!(result, listing(&["dir1/file3"], &["dir1/dir4"]));
}

/// Deleting the last blob of a directory removes the directory.
pub fn check_delete_dir(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    storage.delete("dir2/dir3/file4").expect("delete failed");
    assert!(storage.load("dir2/dir3/file4", MAX_SIZE).is_err());

    let result = storage.list("").expect("list failed");
    assert_eq!(result, listing(&["file1"], &["dir1"]));
}

/// Delete reports missing blobs.
pub fn check_delete_non_existing(storage: &mut dyn Storage) {
    let err = storage
        .delete("dir1/file1")
        .expect_err("delete found dir1/file1");
    assert!(err.is_path_does_not_exist(), "unexpected error: {err}");
}

/// Deleting every blob leaves an empty storage.
pub fn check_delete_all(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    for path in [
        "file1",
        "dir1/file2",
        "dir1/file3",
        "dir1/dir4/file5",
        "dir2/dir3/file4",
    ] {
        storage
            .delete(path)
            .unwrap_or_else(|e| panic!("delete {path} failed: {e}"));
    }

    let result = storage.list("").expect("list failed");
    assert!(result.is_empty(), "storage not empty: {result:?}");
}

/// Delete rejects paths that escape the root.
pub fn check_delete_escapes(storage: &mut dyn Storage) {
    insert_standard_files(storage);

    let err = storage
        .delete("../file1")
        .expect_err("delete accepted ../file1");
    assert!(err.is_invalid_path(), "unexpected error: {err}");
}

/// Operations on rejected paths leave the stored state untouched.
pub fn check_rejected_paths_change_nothing(storage: &mut dyn Storage) {
    insert_standard_files(storage);
    let before = storage.list("dir1").expect("list failed");

    for path in ["/dir1/file2", "dir1/../file1", "dir1/file*2", "dir1\\file2"] {
        let err = storage
            .save(path, b"x")
            .expect_err("save accepted a rejected path");
        assert!(err.is_invalid_path(), "unexpected error: {err}");
        let err = storage
            .delete(path)
            .expect_err("delete accepted a rejected path");
        assert!(err.is_invalid_path(), "unexpected error: {err}");
    }

    assert_eq!(storage.list("dir1").expect("list failed"), before);
    let data = storage.load("dir1/file2", MAX_SIZE).expect("load failed");
    assert_eq!(data, b"test456");
}
