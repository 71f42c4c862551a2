use super::error::{IgnoredKeySet, IgnoredKeysError, JsonKind, StructuralError};
use super::path::{KeyPath, PathSegment};
use crate::schema::{FieldSpec, Schema, SchemaEnum};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A type that can be read out of a JSON value by the pedantic decoder
pub trait Decode: Sized {
    /// What the schema expects here, e.g. "string" or "FileDefinition object"
    fn expected() -> String;

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError>;
}

/// State threaded through one decode call: the current path and the unrecognized keys found so far
#[derive(Debug, Default)]
pub struct DecodeContext {
    path: KeyPath,
    ignored: Vec<IgnoredKeySet>,
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Run `f` with the path extended by `segment`
    pub fn nested<T>(
        &mut self,
        segment: impl Into<PathSegment>,
        f: impl FnOnce(&mut Self) -> Result<T, StructuralError>,
    ) -> Result<T, StructuralError> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn type_mismatch(&self, expected: String, found: &Value) -> StructuralError {
        StructuralError::TypeMismatch {
            path: self.path.clone(),
            expected,
            found: JsonKind::of(found),
        }
    }

    pub fn corrupted(&self, message: impl Into<String>) -> StructuralError {
        StructuralError::DataCorrupted {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn record_ignored(&mut self, ignored_keys: BTreeSet<String>) {
        log::debug!(
            "Unrecognized keys at the {}: {:?}",
            self.path.describe(),
            ignored_keys
        );
        self.ignored.push(IgnoredKeySet {
            path: self.path.clone(),
            ignored_keys,
        });
    }

    /// Called once the whole tree decoded; fails if any object carried unknown keys
    pub fn finish(self) -> Result<(), IgnoredKeysError> {
        if self.ignored.is_empty() {
            Ok(())
        } else {
            Err(IgnoredKeysError {
                keysets: self.ignored,
            })
        }
    }
}

/// Reads the declared fields of one JSON object and remembers which keys the schema knows
pub struct ObjectReader<'v> {
    object: &'v Map<String, Value>,
    fields: &'static [FieldSpec],
}

impl<'v> ObjectReader<'v> {
    pub fn open<S: Schema>(value: &'v Value, cx: &DecodeContext) -> Result<Self, StructuralError> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                fields: S::FIELDS,
            }),
            other => Err(cx.type_mismatch(object_expected::<S>(), other)),
        }
    }

    fn declares(&self, key: &str) -> bool {
        self.spec(key).is_some()
    }

    fn spec(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == key)
    }

    pub fn required<T: Decode>(
        &self,
        key: &'static str,
        cx: &mut DecodeContext,
    ) -> Result<T, StructuralError> {
        debug_assert!(
            self.spec(key).is_some_and(|f| f.required),
            "{} is not declared as a required field",
            key
        );
        match self.object.get(key) {
            None => Err(StructuralError::KeyNotFound {
                path: cx.path().clone(),
                key: key.to_string(),
            }),
            Some(Value::Null) => Err(StructuralError::ValueNotFound {
                path: cx.path().join(key),
                expected: T::expected(),
            }),
            Some(value) => cx.nested(key, |cx| T::decode(value, cx)),
        }
    }

    /// Missing and null both decode as `None`
    pub fn optional<T: Decode>(
        &self,
        key: &'static str,
        cx: &mut DecodeContext,
    ) -> Result<Option<T>, StructuralError> {
        debug_assert!(
            self.spec(key).is_some_and(|f| !f.required),
            "{} is not declared as an optional field",
            key
        );
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => cx.nested(key, |cx| T::decode(value, cx)).map(Some),
        }
    }

    /// Record every key in the object that the schema does not declare
    pub fn finish(self, cx: &mut DecodeContext) {
        let ignored: BTreeSet<String> = self
            .object
            .keys()
            .filter(|key| !self.declares(key.as_str()))
            .cloned()
            .collect();
        if !ignored.is_empty() {
            cx.record_ignored(ignored);
        }
    }
}

pub fn object_expected<S: Schema>() -> String {
    format!("{} object", S::TYPE_NAME)
}

impl Decode for String {
    fn expected() -> String {
        "string".to_string()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(cx.type_mismatch(Self::expected(), other)),
        }
    }
}

impl Decode for i64 {
    fn expected() -> String {
        "integer".to_string()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        match value {
            Value::Number(n) if n.is_i64() => n
                .as_i64()
                .ok_or_else(|| cx.corrupted(format!("{} does not fit in an integer", n))),
            Value::Number(n) if n.is_u64() => {
                Err(cx.corrupted(format!("{} does not fit in an integer", n)))
            }
            // whole-number floats such as `1.0` count as integers
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(cx.corrupted(format!("{} does not fit in an integer", n))),
            },
            other => Err(cx.type_mismatch(Self::expected(), other)),
        }
    }
}

impl Decode for bool {
    fn expected() -> String {
        "boolean".to_string()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(cx.type_mismatch(Self::expected(), other)),
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn expected() -> String {
        format!("array of {}", T::expected())
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(cx.type_mismatch(Self::expected(), other)),
        };
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                return Err(StructuralError::ValueNotFound {
                    path: cx.path().join(index),
                    expected: T::expected(),
                });
            }
            decoded.push(cx.nested(index, |cx| T::decode(item, cx))?);
        }
        Ok(decoded)
    }
}

/// Decode a closed string enum; anything outside the set is corrupted data, not a mismatch
pub fn decode_enum<E: SchemaEnum>(value: &Value, cx: &DecodeContext) -> Result<E, StructuralError> {
    match value {
        Value::String(s) => E::from_wire(s).ok_or_else(|| {
            cx.corrupted(format!(
                "cannot initialize {} from invalid value \"{}\" (expected one of {})",
                E::TYPE_NAME,
                s,
                E::VALUES.join(", ")
            ))
        }),
        other => Err(cx.type_mismatch(enum_expected::<E>(), other)),
    }
}

pub fn enum_expected<E: SchemaEnum>() -> String {
    format!("{} string", E::TYPE_NAME)
}
