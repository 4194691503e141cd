//! List command implementation.

use serde::Serialize;
use std::io::Write;
use stor_core::Storage;

/// Directory listing result.
#[derive(Debug, Serialize)]
pub struct ListResult<'a> {
    /// Listed directory, empty for the root.
    pub dir: &'a str,
    /// Blobs in the directory.
    pub files: &'a [String],
    /// Subdirectories.
    pub dirs: &'a [String],
}

/// Runs the list command.
pub fn run(
    storage: &dyn Storage,
    dir: &str,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let listing = storage.list(dir)?;

    match format {
        "json" => {
            let result = ListResult {
                dir,
                files: &listing.files,
                dirs: &listing.dirs,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        }
        _ => {
            for dir in &listing.dirs {
                writeln!(out, "{dir}/")?;
            }
            for file in &listing.files {
                writeln!(out, "{file}")?;
            }
        }
    }

    Ok(())
}
