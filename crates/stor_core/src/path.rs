//! Storage path sanitizing.
//!
//! Every backend passes caller paths through [`clean_path`] before touching
//! its substrate. A canonical path:
//!
//! - uses `/` as the only separator, on every platform
//! - consists of ASCII letters, digits, `.`, `_` and `-`
//! - never starts with `/` and never contains `..`
//! - has no empty or `.` segments; the empty string is the storage root

use crate::error::{StorageError, StorageResult};

/// Separates path segments.
pub const DELIMITER: char = '/';

/// Character combinations that are rejected anywhere in a path.
pub const FORBIDDEN: &[&str] = &[".."];

/// Returns true if `byte` may appear in a path.
#[must_use]
pub const fn is_valid_byte(byte: u8) -> bool {
    matches!(byte, b'.' | b'_' | b'-' | b'/') || byte.is_ascii_alphanumeric()
}

/// Validates `raw` and returns its canonical form.
///
/// Rules are applied in order and the first failure wins: forbidden
/// combinations, absolute paths, then invalid bytes.
///
/// # Errors
///
/// Returns [`StorageError::InvalidPath`] if the path is rejected.
///
/// # Example
///
/// ```rust
/// use stor_core::clean_path;
///
/// assert_eq!(clean_path("dir1//file_1").unwrap(), "dir1/file_1");
/// assert_eq!(clean_path("./").unwrap(), "");
/// assert!(clean_path("../file1").unwrap_err().is_invalid_path());
/// ```
pub fn clean_path(raw: &str) -> StorageResult<String> {
    for forbid in FORBIDDEN {
        if raw.contains(forbid) {
            return Err(StorageError::invalid_path(
                raw,
                format!("contains forbidden combination {forbid}"),
            ));
        }
    }

    if raw.starts_with(DELIMITER) {
        return Err(StorageError::invalid_path(raw, "absolute path"));
    }

    if let Some((index, byte)) = raw.bytes().enumerate().find(|&(_, b)| !is_valid_byte(b)) {
        return Err(StorageError::invalid_path(
            raw,
            format!("forbidden byte 0x{byte:02x} at index {index}"),
        ));
    }

    // Only valid bytes remain, so every segment is plain ASCII.
    let segments: Vec<&str> = raw
        .split(DELIMITER)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    Ok(segments.join("/"))
}

/// Like [`clean_path`], but also rejects the storage root, which can never
/// hold a blob.
///
/// # Errors
///
/// Returns [`StorageError::InvalidPath`] if the path is rejected or denotes
/// the root.
pub fn clean_blob_path(raw: &str) -> StorageResult<String> {
    let clean = clean_path(raw)?;
    if clean.is_empty() {
        return Err(StorageError::invalid_path(raw, "the storage root is not a blob"));
    }
    Ok(clean)
}

/// Splits a canonical path into its segments. The root has none.
pub fn segments(canonical: &str) -> impl Iterator<Item = &str> {
    canonical.split(DELIMITER).filter(|s| !s.is_empty())
}

/// Joins a canonical directory path with the name of one of its entries.
///
/// ```rust
/// use stor_core::join_path;
///
/// assert_eq!(join_path("", "file1"), "file1");
/// assert_eq!(join_path("dir1", "file2"), "dir1/file2");
/// ```
#[must_use]
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}{DELIMITER}{name}")
    }
}
