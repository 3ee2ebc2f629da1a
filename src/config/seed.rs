//! Seed configuration loading.
//!
//! A pre-existing `.clang-format` is treated as ground truth: every known
//! option found there is pinned for the whole run and excluded from
//! discovery. Unknown keys (and non-scalar values such as `ForEachMacros`
//! lists) are preserved verbatim for round-trip emission, with a warning.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::catalog;
use crate::config::style::{flatten_mapping, scalar_to_string, StyleConfig};

/// Well-known name of the clang-format configuration file.
pub const SEED_FILE_NAME: &str = ".clang-format";

/// Error type for seed loading. Only a structurally unreadable document is
/// fatal; shape and value problems degrade to warnings.
#[derive(Debug)]
pub enum SeedError {
    /// IO error reading the file
    Io(io::Error),
    /// YAML syntax error: not even a valid document
    Parse(serde_yaml::Error),
    /// Valid YAML, but the top level is not a mapping
    NotAMapping,
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Io(e) => write!(f, "failed to read seed file: {e}"),
            SeedError::Parse(e) => write!(f, "failed to parse seed file: {e}"),
            SeedError::NotAMapping => write!(f, "seed file is not a YAML mapping"),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::Io(e) => Some(e),
            SeedError::Parse(e) => Some(e),
            SeedError::NotAMapping => None,
        }
    }
}

impl From<io::Error> for SeedError {
    fn from(e: io::Error) -> Self {
        SeedError::Io(e)
    }
}

impl From<serde_yaml::Error> for SeedError {
    fn from(e: serde_yaml::Error) -> Self {
        SeedError::Parse(e)
    }
}

/// One entry read from the seed file, keyed by flattened identifier.
#[derive(Debug, Clone)]
pub enum SeedValue {
    /// Known option with a scalar value: pinned and excluded from search.
    Pinned(String),
    /// Anything else: carried verbatim into the emitted document.
    Raw(Value),
}

/// Parsed seed file: the pinned subset plus passthrough entries, in
/// document order, and the warnings collected while reading it.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    entries: Vec<(String, SeedValue)>,
    pub warnings: Vec<String>,
}

impl Seed {
    /// An empty seed: every option is subject to discovery.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries in seed-document order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SeedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Known options pinned to a scalar value.
    pub fn pins(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            SeedValue::Pinned(value) => Some((k.as_str(), value.as_str())),
            SeedValue::Raw(_) => None,
        })
    }

    /// Whether `name` is a known option fixed by the seed file. A known key
    /// carrying a non-scalar value is still excluded from search.
    pub fn is_pinned(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(k, _)| k == name && catalog::is_known(k))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Search upward from `start_dir` for a `.clang-format` seed file, stopping
/// at the git repository root. `None` means every option is discovered.
pub fn find_seed_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(SEED_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load and classify the seed file at `path`.
///
/// Known options with a value outside the tuned candidate set are pinned
/// anyway: the seed records user intent and is never overridden, the warning
/// only notes that the value will not be re-derived.
pub fn load_seed(path: &Path) -> Result<Seed, SeedError> {
    let text = fs::read_to_string(path)?;
    parse_seed(&text)
}

/// Parse a seed document from text.
pub fn parse_seed(text: &str) -> Result<Seed, SeedError> {
    if text.trim().is_empty() {
        return Ok(Seed::empty());
    }
    let doc: Value = serde_yaml::from_str(text)?;
    let mapping = match doc {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(Seed::empty()),
        _ => return Err(SeedError::NotAMapping),
    };

    let mut seed = Seed::empty();
    for (key, value) in flatten_mapping(&mapping) {
        if !catalog::is_known(&key) {
            seed.warnings
                .push(format!("unknown option '{key}' kept verbatim, not tuned"));
            seed.entries.push((key, SeedValue::Raw(value)));
            continue;
        }
        match scalar_to_string(&value) {
            Some(scalar) => {
                if let Ok(def) = catalog::lookup(&key) {
                    if !def.domain.contains(&scalar) {
                        seed.warnings.push(format!(
                            "'{key}: {scalar}' is outside the tuned candidate set, pinned as-is"
                        ));
                    }
                }
                seed.entries.push((key, SeedValue::Pinned(scalar)));
            }
            None => {
                seed.warnings.push(format!(
                    "'{key}' has a non-scalar value, kept verbatim and excluded from tuning"
                ));
                seed.entries.push((key, SeedValue::Raw(value)));
            }
        }
    }
    Ok(seed)
}

/// The pinned entries as a [`StyleConfig`] fragment, in seed order.
pub fn pin_config(seed: &Seed) -> StyleConfig {
    seed.pins()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
