//! Single-blob commands: exists, meta, cat, put and rm.

use serde::Serialize;
use std::io::{Read, Write};
use stor_core::Storage;
use tracing::info;

/// Blob metadata result.
#[derive(Debug, Serialize)]
pub struct MetaResult<'a> {
    /// Blob path as given.
    pub path: &'a str,
    /// Size in bytes, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Prints whether a blob exists and returns the answer.
pub fn exists(
    storage: &dyn Storage,
    path: &str,
    out: &mut impl Write,
) -> Result<bool, Box<dyn std::error::Error>> {
    let exists = storage.exist(path)?;
    writeln!(out, "{exists}")?;
    Ok(exists)
}

/// Prints blob metadata.
pub fn meta(
    storage: &dyn Storage,
    path: &str,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let meta = storage.meta(path)?;
    let result = MetaResult {
        path,
        size: meta.size,
    };

    match format {
        "json" => writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?,
        _ => match result.size {
            Some(size) => writeln!(out, "{path}: {} ({size} bytes)", format_size(size))?,
            None => writeln!(out, "{path}: size unknown")?,
        },
    }

    Ok(())
}

/// Writes blob content to `out`.
pub fn cat(
    storage: &dyn Storage,
    path: &str,
    max_size: u64,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = storage.load(path, max_size)?;
    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}

/// Stores `data` as a blob.
pub fn put(
    storage: &mut dyn Storage,
    path: &str,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    storage.save(path, data)?;
    info!("Stored {} bytes at {}", data.len(), path);
    Ok(())
}

/// Deletes a blob.
pub fn remove(storage: &mut dyn Storage, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    storage.delete(path)?;
    info!("Deleted {}", path);
    Ok(())
}

/// Reads all of `input`.
pub fn read_all(mut input: impl Read) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    Ok(data)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
