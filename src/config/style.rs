//! Flat, insertion-ordered style settings.
//!
//! A `.clang-format` document is a YAML mapping whose nested sections
//! (`BraceWrapping`) are flattened here with a `:` delimiter, and whose
//! scalars are all handled as plain strings so that `4`, `true` and `LLVM`
//! travel through the search uniformly.

use serde_yaml::Value;

/// Delimiter joining nested mapping keys into a flat identifier.
pub const KEY_DELIMITER: char = ':';

/// A flat option-id → value mapping, total over the catalog once the search
/// engine has initialized it. Insertion order is preserved so that output
/// is reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleConfig {
    entries: Vec<(String, String)>,
}

impl StyleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, if assigned.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Assign `key`, replacing any previous value in place (insertion order
    /// of the first assignment is kept).
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for StyleConfig {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut config = Self::new();
        for (k, v) in iter {
            config.set(&k, &v);
        }
        config
    }
}

/// Render a YAML scalar as the plain string the search works with.
/// `true`/`false`, numbers and strings all normalize to their canonical
/// text; non-scalar values yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Parse a plain string back into the most specific YAML scalar, so the
/// emitted document reads like a hand-written `.clang-format`
/// (`IndentWidth: 4`, `AlignTrailingComments: true`).
pub fn typed_scalar(value: &str) -> Value {
    if value == "true" {
        return Value::Bool(true);
    }
    if value == "false" {
        return Value::Bool(false);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    Value::String(value.to_string())
}

/// Walk a YAML mapping depth-first, yielding `(flattened-key, leaf-value)`
/// pairs in document order. Nested mapping keys are joined with
/// [`KEY_DELIMITER`].
pub fn flatten_mapping(mapping: &serde_yaml::Mapping) -> Vec<(String, Value)> {
    let mut flat = vec![];
    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s.clone(),
            other => match scalar_to_string(other) {
                Some(s) => s,
                None => continue,
            },
        };
        match value {
            Value::Mapping(nested) => {
                for (sub_key, sub_value) in flatten_mapping(nested) {
                    flat.push((format!("{key}{KEY_DELIMITER}{sub_key}"), sub_value));
                }
            }
            other => flat.push((key, other.clone())),
        }
    }
    flat
}

/// Insert a flattened key into a YAML mapping, re-creating the nested
/// sections the flat form collapsed.
pub fn insert_nested(mapping: &mut serde_yaml::Mapping, flat_key: &str, value: Value) {
    match flat_key.split_once(KEY_DELIMITER) {
        None => {
            mapping.insert(Value::String(flat_key.to_string()), value);
        }
        Some((head, rest)) => {
            let head_key = Value::String(head.to_string());
            if !matches!(mapping.get(&head_key), Some(Value::Mapping(_))) {
                mapping.insert(head_key.clone(), Value::Mapping(serde_yaml::Mapping::new()));
            }
            if let Some(Value::Mapping(nested)) = mapping.get_mut(&head_key) {
                insert_nested(nested, rest, value);
            }
        }
    }
}
