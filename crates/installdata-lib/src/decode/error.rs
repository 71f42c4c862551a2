use super::path::KeyPath;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// The kind of a raw JSON value, for "expected X, found Y" messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonKind::Integer,
            Value::Number(_) => JsonKind::Float,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Integer => "integer",
            JsonKind::Float => "floating point number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// The document does not have the shape the schema requires.
/// Decoding stops at the first one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    /// `path` is the object that should have contained `key`
    #[error("a \"{key}\" key should be at the {}, but there wasn't anything there", .path.describe())]
    KeyNotFound { path: KeyPath, key: String },

    #[error("there should be a {expected} at the {}, but the value was null", .path.describe())]
    ValueNotFound { path: KeyPath, expected: String },

    #[error("there should be a {expected} at the {}, but found a {found}", .path.describe())]
    TypeMismatch {
        path: KeyPath,
        expected: String,
        found: JsonKind,
    },

    /// Invalid JSON, or a value that has the right kind but an illegal content
    #[error("something went wrong decoding the {}: {message}", .path.describe())]
    DataCorrupted { path: KeyPath, message: String },
}

impl StructuralError {
    /// Where the problem is; for a missing key this includes the key itself
    pub fn location(&self) -> KeyPath {
        match self {
            StructuralError::KeyNotFound { path, key } => path.join(key.as_str()),
            StructuralError::ValueNotFound { path, .. }
            | StructuralError::TypeMismatch { path, .. }
            | StructuralError::DataCorrupted { path, .. } => path.clone(),
        }
    }
}

/// Keys that were present in one JSON object but are not part of its schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredKeySet {
    pub path: KeyPath,
    pub ignored_keys: BTreeSet<String>,
}

/// Every location in the document holding unrecognized keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized keys at {} location(s)", .keysets.len())]
pub struct IgnoredKeysError {
    pub keysets: Vec<IgnoredKeySet>,
}

impl IgnoredKeysError {
    pub fn find(&self, path: &KeyPath) -> Option<&IgnoredKeySet> {
        self.keysets.iter().find(|set| &set.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    IgnoredKeys(#[from] IgnoredKeysError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_and_floats_are_distinct_kinds() {
        assert_eq!(JsonKind::of(&json!(3)), JsonKind::Integer);
        assert_eq!(JsonKind::of(&json!(3.5)), JsonKind::Float);
        assert_eq!(JsonKind::of(&json!(null)), JsonKind::Null);
    }

    #[test]
    fn missing_key_location_includes_key() {
        let err = StructuralError::KeyNotFound {
            path: crate::key_path!["mods", 0usize],
            key: "target".to_string(),
        };
        assert_eq!(err.location(), crate::key_path!["mods", 0usize, "target"]);
        assert_eq!(
            err.to_string(),
            "a \"target\" key should be at the path mods → 0, but there wasn't anything there"
        );
    }
}
