//! Emission of the discovered configuration.
//!
//! The output document merges the seed entries (verbatim, in seed order)
//! with the discovered values (catalog declaration order), rebuilds the
//! nested `BraceWrapping` section from the flattened keys, and types the
//! scalars so the result reads like a hand-written `.clang-format`.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde_yaml::Value;

use crate::catalog;
use crate::config::seed::{Seed, SeedValue};
use crate::config::style::{insert_nested, typed_scalar, StyleConfig};

/// Error type for serializing or writing the output document. Always fatal.
#[derive(Debug)]
pub enum EmitError {
    /// YAML serialization failed
    Serialize(serde_yaml::Error),
    /// Writing the output file failed
    Io(io::Error),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::Serialize(e) => write!(f, "failed to serialize configuration: {e}"),
            EmitError::Io(e) => write!(f, "failed to write configuration: {e}"),
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitError::Serialize(e) => Some(e),
            EmitError::Io(e) => Some(e),
        }
    }
}

impl From<serde_yaml::Error> for EmitError {
    fn from(e: serde_yaml::Error) -> Self {
        EmitError::Serialize(e)
    }
}

impl From<io::Error> for EmitError {
    fn from(e: io::Error) -> Self {
        EmitError::Io(e)
    }
}

/// Render the merged seed + discovered configuration as a YAML document
/// with explicit start/end markers.
///
/// Seed entries come first in their original order, exactly as loaded, so
/// user intent recorded there survives round-trips byte-for-byte at the
/// value level. Every remaining catalog option follows in declaration
/// order with its discovered value: the emitted configuration is total.
pub fn render(seed: &Seed, discovered: &StyleConfig) -> Result<String, EmitError> {
    let mut mapping = serde_yaml::Mapping::new();

    for (key, value) in seed.entries() {
        match value {
            SeedValue::Pinned(scalar) => insert_nested(&mut mapping, key, typed_scalar(scalar)),
            SeedValue::Raw(raw) => insert_nested(&mut mapping, key, raw.clone()),
        }
    }

    for def in catalog::all() {
        if seed.entries().any(|(k, _)| k == def.name) {
            continue;
        }
        let value = discovered.get(def.name).unwrap_or(def.default);
        insert_nested(&mut mapping, def.name, typed_scalar(value));
    }

    let body = serde_yaml::to_string(&Value::Mapping(mapping))?;
    Ok(format!("---\n{body}...\n"))
}

/// Render and write the output document to `path`.
pub fn write(path: &Path, seed: &Seed, discovered: &StyleConfig) -> Result<(), EmitError> {
    let document = render(seed, discovered)?;
    fs::write(path, document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::seed::parse_seed;

    fn discovered_defaults() -> StyleConfig {
        catalog::all()
            .iter()
            .map(|def| (def.name.to_string(), def.default.to_string()))
            .collect()
    }

    #[test]
    fn test_document_markers() {
        let text = render(&Seed::empty(), &discovered_defaults()).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.ends_with("...\n"));
    }

    #[test]
    fn test_output_is_total_over_the_catalog() {
        let text = render(&Seed::empty(), &discovered_defaults()).unwrap();
        let doc: Value = serde_yaml::from_str(&text).unwrap();
        let Value::Mapping(mapping) = doc else {
            panic!("expected mapping");
        };
        // BraceWrapping:* collapse into one nested section
        let nested: usize = catalog::all()
            .iter()
            .filter(|def| def.name.starts_with("BraceWrapping:"))
            .count();
        assert_eq!(mapping.len(), catalog::all().len() - nested + 1);
    }

    #[test]
    fn test_scalars_are_typed() {
        let text = render(&Seed::empty(), &discovered_defaults()).unwrap();
        assert!(text.contains("IndentWidth: 2\n"));
        assert!(text.contains("AlignTrailingComments: true\n"));
        assert!(text.contains("BasedOnStyle: LLVM\n"));
        assert!(text.contains("AccessModifierOffset: -2\n"));
    }

    #[test]
    fn test_brace_wrapping_is_nested() {
        let text = render(&Seed::empty(), &discovered_defaults()).unwrap();
        assert!(text.contains("BraceWrapping:\n"));
        assert!(text.contains("  AfterClass: false\n"));
        assert!(!text.contains("BraceWrapping:AfterClass"));
    }

    #[test]
    fn test_seed_entries_come_first_verbatim() {
        let seed = parse_seed("UseTab: Always\nIndentWidth: 5\n").unwrap();
        let mut discovered = discovered_defaults();
        // even a diverging engine value must not override the pin on output
        discovered.set("UseTab", "Never");

        let text = render(&seed, &discovered).unwrap();
        let use_tab = text.lines().position(|l| l == "UseTab: Always").unwrap();
        let indent = text.lines().position(|l| l == "IndentWidth: 5").unwrap();
        let based_on = text.lines().position(|l| l.starts_with("BasedOnStyle")).unwrap();
        assert!(use_tab < indent);
        assert!(indent < based_on);
        assert!(!text.contains("UseTab: Never"));
    }

    #[test]
    fn test_unknown_seed_keys_round_trip() {
        let seed = parse_seed("Language: Cpp\nForEachMacros: [FOREACH, RANGES_FOR]\n").unwrap();
        let text = render(&seed, &discovered_defaults()).unwrap();
        assert!(text.contains("Language: Cpp\n"));
        assert!(text.contains("ForEachMacros:\n"));
        assert!(text.contains("- FOREACH\n"));
    }

    #[test]
    fn test_write_creates_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".clang-format");
        write(&path, &Seed::empty(), &discovered_defaults()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("---\n"));
    }
}
