//! Property-based test generators using proptest.
//!
//! Provides strategies for canonical paths, hostile paths, blob contents and
//! sequences of storage operations.

use proptest::prelude::*;

/// Strategy for a single valid path segment.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-][a-zA-Z0-9._-]{0,11}")
        .expect("Invalid regex")
        .prop_filter("Segment must not contain ..", |s| !s.contains(".."))
}

/// Strategy for canonical blob paths (one to four segments).
pub fn canonical_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 1..=4).prop_map(|segments| segments.join("/"))
}

/// Strategy for raw paths that denote a canonical path but are written
/// sloppily: doubled separators, `.` segments, trailing separators.
///
/// Yields `(raw, canonical)` pairs.
pub fn sloppy_path_strategy() -> impl Strategy<Value = (String, String)> {
    prop::collection::vec((segment_strategy(), 0..3usize, any::<bool>()), 1..=4).prop_map(
        |parts| {
            let canonical: Vec<&str> = parts.iter().map(|(s, _, _)| s.as_str()).collect();
            let mut raw = String::new();
            for (segment, extra_separators, with_dot) in &parts {
                if *with_dot {
                    raw.push_str("./");
                }
                raw.push_str(segment);
                raw.push('/');
                raw.push_str(&"/".repeat(*extra_separators));
            }
            (raw, canonical.join("/"))
        },
    )
}

/// Strategy for paths that every storage must reject.
pub fn hostile_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        canonical_path_strategy().prop_map(|p| format!("../{p}")),
        canonical_path_strategy().prop_map(|p| format!("{p}/..")),
        (canonical_path_strategy(), canonical_path_strategy())
            .prop_map(|(a, b)| format!("{a}/../{b}")),
        canonical_path_strategy().prop_map(|p| format!("/{p}")),
        (canonical_path_strategy(), "[ *:\\\\?<>|\"]")
            .prop_map(|(p, bad)| format!("{p}{bad}")),
        canonical_path_strategy().prop_map(|p| format!("{p}\u{e9}")),
    ]
}

/// Strategy for blob contents.
pub fn blob_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

/// An operation against a storage.
#[derive(Debug, Clone)]
pub enum StorageOperation {
    /// Save a blob.
    Save {
        /// The blob path.
        path: String,
        /// The blob contents.
        data: Vec<u8>,
    },
    /// Delete a blob.
    Delete {
        /// The blob path.
        path: String,
    },
    /// Load a blob.
    Load {
        /// The blob path.
        path: String,
    },
}

/// Strategy for paths drawn from a small name space, so that operations in a
/// sequence collide and exercise overwrites, nested directories and pruning.
pub fn colliding_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just("a"), Just("b"), Just("c")], 1..=3)
        .prop_map(|segments| segments.join("/"))
}

/// Strategy for a single storage operation.
pub fn storage_operation_strategy() -> impl Strategy<Value = StorageOperation> {
    prop_oneof![
        3 => (colliding_path_strategy(), blob_strategy())
            .prop_map(|(path, data)| StorageOperation::Save { path, data }),
        2 => colliding_path_strategy().prop_map(|path| StorageOperation::Delete { path }),
        2 => colliding_path_strategy().prop_map(|path| StorageOperation::Load { path }),
    ]
}

/// Strategy for a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StorageOperation>> {
    prop::collection::vec(storage_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
