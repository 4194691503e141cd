//! Error types for storage operations.

use crate::storage_type::StorageType;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// Callers classify errors by variant (see the `is_*` predicates), never by
/// the rendered message.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The path is syntactically invalid or escapes the storage root.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path as supplied by the caller.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// No blob exists at the path.
    #[error("path does not exist: {path:?}")]
    PathDoesNotExist {
        /// The canonical path that was looked up.
        path: String,
    },

    /// A blob is larger than the caller accepts.
    #[error("{what:?} is too large: {size} bytes exceeds maximum of {max_size}")]
    TooLarge {
        /// What was too large (the canonical path).
        what: String,
        /// The stored size in bytes.
        size: u64,
        /// The maximum size the caller accepted.
        max_size: u64,
    },

    /// The configuration does not name a storage type.
    #[error("storage type is unspecified")]
    UnspecifiedType,

    /// The configuration names a storage type nobody registered.
    #[error("storage type {storage_type} is not registered")]
    UnregisteredType {
        /// The unknown type.
        storage_type: StorageType,
    },

    /// The base directory of a local storage cannot be used.
    #[error("unable to use base directory {path:?}: {reason}")]
    InvalidBaseDir {
        /// The configured directory.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Parser diagnostics.
        message: String,
    },

    /// An I/O error occurred in the underlying substrate.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Creates an [`StorageError::InvalidPath`] error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`StorageError::PathDoesNotExist`] error.
    pub fn path_does_not_exist(path: impl Into<String>) -> Self {
        Self::PathDoesNotExist { path: path.into() }
    }

    /// Creates an [`StorageError::InvalidBaseDir`] error.
    pub fn invalid_base_dir(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseDir {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for [`StorageError::InvalidPath`].
    #[must_use]
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath { .. })
    }

    /// Returns true for [`StorageError::PathDoesNotExist`].
    #[must_use]
    pub fn is_path_does_not_exist(&self) -> bool {
        matches!(self, Self::PathDoesNotExist { .. })
    }

    /// Returns true for [`StorageError::TooLarge`].
    #[must_use]
    pub fn is_too_large(&self) -> bool {
        matches!(self, Self::TooLarge { .. })
    }

    /// Returns true for [`StorageError::UnspecifiedType`].
    #[must_use]
    pub fn is_unspecified_type(&self) -> bool {
        matches!(self, Self::UnspecifiedType)
    }

    /// Returns true for [`StorageError::UnregisteredType`].
    #[must_use]
    pub fn is_unregistered_type(&self) -> bool {
        matches!(self, Self::UnregisteredType { .. })
    }
}
