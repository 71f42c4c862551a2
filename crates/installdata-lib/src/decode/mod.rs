//! Pedantic JSON decoding.
//!
//! A plain schema decoder silently skips keys it doesn't know about. For a hand-written
//! listing that hides typos (a misspelled `steam` makes an override apply everywhere), so this
//! decoder diffs every object against its schema and fails if anything was left unread.
//!
//! Structural problems abort the decode immediately. Unrecognized keys are collected across
//! the whole tree and reported together once decoding finishes.

pub mod context;
pub mod error;
pub mod impls;
pub mod path;

pub use context::{Decode, DecodeContext, ObjectReader};
pub use error::{DecodeError, IgnoredKeySet, IgnoredKeysError, JsonKind, StructuralError};
pub use path::{KeyPath, PathSegment, PATH_SEPARATOR};

use crate::schema::InstallDataDefinition;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct PedanticDecoder;

impl PedanticDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode<T: Decode>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            StructuralError::DataCorrupted {
                path: KeyPath::root(),
                message: format!("the given data was not valid JSON: {}", e),
            }
        })?;
        self.decode_value(&value)
    }

    pub fn decode_value<T: Decode>(&self, value: &Value) -> Result<T, DecodeError> {
        let mut cx = DecodeContext::new();
        let decoded = T::decode(value, &mut cx)?;
        cx.finish()?;
        Ok(decoded)
    }
}

/// Decode an `installData.json` buffer
pub fn decode_install_data(bytes: &[u8]) -> Result<InstallDataDefinition, DecodeError> {
    let decoded: InstallDataDefinition = PedanticDecoder::new().decode(bytes)?;
    log::debug!(
        "Decoded installData version {} with {} mod(s)",
        decoded.version,
        decoded.mods.len()
    );
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_is_corrupted_at_top_level() {
        let err = decode_install_data(b"{\"version\": 2,").unwrap_err();
        match err {
            DecodeError::Structural(StructuralError::DataCorrupted { path, message }) => {
                assert!(path.is_root());
                assert!(message.contains("not valid JSON"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn stray_top_level_key_is_rejected() {
        let err = decode_install_data(br#"{"version": 2, "mods": [], "comment": "x"}"#).unwrap_err();
        match err {
            DecodeError::IgnoredKeys(err) => {
                let set = err.find(&KeyPath::root()).unwrap();
                assert_eq!(set.ignored_keys.iter().collect::<Vec<_>>(), vec!["comment"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
