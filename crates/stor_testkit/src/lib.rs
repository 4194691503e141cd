//! # stor Testkit
//!
//! Test utilities for stor storages.
//!
//! This crate provides:
//! - Test fixtures and scratch storages
//! - Property-based test generators using proptest
//! - A conformance suite every storage implementation must pass
//! - A model-based integration harness
//! - Fuzz testing harnesses
//!
//! ## Usage
//!
//! ```rust
//! use stor_core::Storage;
//! use stor_testkit::prelude::*;
//!
//! with_temp_local_dir(|storage, _base| {
//!     insert_standard_files(storage);
//!     assert!(storage.exist("dir1/file2").unwrap());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod conformance;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::conformance::Fixture;
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
