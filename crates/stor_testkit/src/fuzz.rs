//! Fuzz testing harnesses for stor.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks.

use crate::generators::StorageOperation;
use crate::integration::StorageHarness;
use stor_core::{clean_path, path, Config, MemoryStorage};

/// Fuzz target for path sanitizing.
///
/// Tests that arbitrary input either:
/// - Is rejected with an invalid path error, or
/// - Cleans to a canonical path that cleans to itself
pub fn fuzz_clean_path(data: &[u8]) {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    match clean_path(raw) {
        Ok(clean) => {
            assert!(!clean.starts_with('/'), "absolute output: {clean:?}");
            assert!(!clean.ends_with('/'), "trailing separator: {clean:?}");
            assert!(!clean.contains(".."), "forbidden combination: {clean:?}");
            assert!(
                clean.bytes().all(path::is_valid_byte),
                "invalid byte in {clean:?}"
            );
            if !clean.is_empty() {
                assert!(
                    clean.split('/').all(|s| !s.is_empty() && s != "."),
                    "unclean segment in {clean:?}"
                );
            }
            assert_eq!(clean_path(&clean).ok().as_deref(), Some(clean.as_str()));
        }
        Err(e) => assert!(e.is_invalid_path(), "unexpected error: {e}"),
    }
}

/// Fuzz target for configuration parsing.
pub fn fuzz_config_json(data: &[u8]) {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing should never panic
    if let Err(e) = Config::from_json(json) {
        let _ = e.to_string();
    }
}

/// Structured fuzzing input for storage operations.
pub mod structured {
    use super::*;

    /// Path names the parser chooses from. A small set makes operations
    /// collide.
    const NAMES: [&str; 4] = ["a", "b", "c", "d"];

    /// Parses a sequence of operations from raw bytes.
    ///
    /// Each operation is an opcode byte and a path byte; saves are followed
    /// by a length byte and that many data bytes.
    pub fn parse_sequence(data: &[u8]) -> Vec<StorageOperation> {
        let mut ops = Vec::new();
        let mut offset = 0;

        while offset + 2 <= data.len() {
            let op = data[offset];
            let path = parse_path(data[offset + 1]);
            offset += 2;

            match op % 3 {
                0 => {
                    let len = data.get(offset).copied().unwrap_or(0) as usize;
                    offset += 1;
                    let end = (offset + len).min(data.len());
                    let payload = data.get(offset..end).unwrap_or_default().to_vec();
                    offset = end;
                    ops.push(StorageOperation::Save {
                        path,
                        data: payload,
                    });
                }
                1 => ops.push(StorageOperation::Delete { path }),
                _ => ops.push(StorageOperation::Load { path }),
            }
        }

        ops
    }

    /// Builds a path of one to three segments from the bits of `byte`.
    fn parse_path(byte: u8) -> String {
        let depth = usize::from(byte >> 6) % 3 + 1;
        (0..depth)
            .map(|level| NAMES[usize::from(byte >> (level * 2)) & 0b11])
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Executes operations against an in-memory storage, checking each
    /// result against the model.
    pub fn execute_sequence(ops: &[StorageOperation]) {
        let mut harness = StorageHarness::new(Box::new(MemoryStorage::new()));
        harness.apply_all(ops);
    }
}

/// Fuzz target for storage operation sequences.
pub fn fuzz_storage_operations(data: &[u8]) {
    let ops = structured::parse_sequence(data);
    structured::execute_sequence(&ops);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::{DefaultHasher, Hash, Hasher};

    /// Generate pseudo-random data for fuzzing based on a seed.
    fn generate_random_data(seed: u64, len: usize) -> Vec<u8> {
        let mut hasher = DefaultHasher::new();
        let mut result = Vec::with_capacity(len);
        let mut state = seed;

        for _ in 0..len {
            state.hash(&mut hasher);
            state = hasher.finish();
            hasher = DefaultHasher::new();
            result.push((state & 0xFF) as u8);
        }

        result
    }

    #[test]
    fn test_fuzz_clean_path_empty() {
        fuzz_clean_path(&[]);
    }

    #[test]
    fn test_fuzz_clean_path_known_inputs() {
        for input in [
            &b"dir1//file1"[..],
            b"./.",
            b"../x",
            b"/abs",
            b"a/./b/",
            b"a\0b",
            b"\xff\xfe",
            "caf\u{e9}".as_bytes(),
        ] {
            fuzz_clean_path(input);
        }
    }

    #[test]
    fn test_fuzz_clean_path_random() {
        for seed in 0..200 {
            let data = generate_random_data(seed, (seed % 24) as usize);
            fuzz_clean_path(&data);
        }
    }

    #[test]
    fn test_fuzz_config_json() {
        fuzz_config_json(b"");
        fuzz_config_json(b"{");
        fuzz_config_json(br#"{"type": "Memory"}"#);
        fuzz_config_json(br#"{"type": 5, "path": []}"#);
    }

    #[test]
    fn test_parse_sequence() {
        let ops = structured::parse_sequence(&[0, 0b01_00_01_10, 2, b'h', b'i', 1, 0]);
        assert_eq!(ops.len(), 2);
        match &ops[0] {
            StorageOperation::Save { path, data } => {
                assert_eq!(path, "c/b");
                assert_eq!(data, b"hi");
            }
            other => panic!("expected save, got {other:?}"),
        }
        match &ops[1] {
            StorageOperation::Delete { path } => assert_eq!(path, "a"),
            other => panic!("expected delete, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_sequence_truncated_save() {
        let ops = structured::parse_sequence(&[3, 0, 200, 1, 2]);
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            StorageOperation::Save { data, .. } => assert_eq!(data, &[1, 2]),
            other => panic!("expected save, got {other:?}"),
        }
    }

    #[test]
    fn test_fuzz_storage_operations_random() {
        for seed in 0..100 {
            let data = generate_random_data(seed, 64);
            fuzz_storage_operations(&data);
        }
    }
}
