//! # stor
//!
//! A uniform blob storage abstraction.
//!
//! Blobs are addressed by slash-separated relative paths (`dir1/file2`, on
//! every platform). A [`Storage`] can list, check, load, save and delete
//! them; interchangeable implementations map those operations onto different
//! substrates.
//!
//! ## Design Principles
//!
//! - Storages are opaque byte stores; they never interpret blob contents
//! - Every path passes through [`clean_path`] before any substrate access
//! - Errors are classified by [`StorageError`] variant, never by message
//! - Storage types are bound to constructors by an explicit [`Registry`]
//!
//! ## Available Storages
//!
//! - [`MemoryStorage`] - For tests and volatile caches
//! - [`LocalDir`] - Files below a base directory on the local file system
//!
//! ## Example
//!
//! ```rust
//! use stor_core::{Config, Registry, Storage, MEMORY_STORAGE_TYPE};
//!
//! let registry = Registry::with_builtin();
//! let config = Config::new().storage_type(MEMORY_STORAGE_TYPE);
//! let mut storage = registry.construct(&config).unwrap();
//!
//! storage.save("dir1/file1", b"hello world").unwrap();
//! assert_eq!(storage.load("dir1/file1", 1024).unwrap(), b"hello world");
//! assert!(storage.load("dir1/file1", 5).unwrap_err().is_too_large());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod local_dir;
mod memory;
pub mod path;
mod registry;
mod storage_type;

pub use backend::{Listing, Meta, Storage};
pub use config::Config;
pub use error::{StorageError, StorageResult};
pub use local_dir::{LocalDir, LOCAL_DIR_STORAGE_TYPE};
pub use memory::{MemoryStorage, MEMORY_STORAGE_TYPE};
pub use path::{clean_blob_path, clean_path, join_path};
pub use registry::{Constructor, Registry};
pub use storage_type::{StorageType, MAX_TYPE_LEN};

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
