//! Types command implementation.

use std::io::Write;
use stor_core::Registry;

/// Prints the registered storage types, one per line.
pub fn run(registry: &Registry, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    for storage_type in registry.registered_types() {
        writeln!(out, "{storage_type}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_builtin_types_sorted() {
        let mut out = Vec::new();
        run(&Registry::with_builtin(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "LocalDir\nMemory\n");
    }
}
