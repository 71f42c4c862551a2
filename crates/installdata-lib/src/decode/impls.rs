//! Decode implementations for the installData schema types.
//!
//! Every record reads its declared fields through an [`ObjectReader`] and then calls
//! `finish` so that leftover keys are recorded against the record's path.

use super::context::{decode_enum, enum_expected, object_expected, Decode, DecodeContext, ObjectReader};
use super::error::StructuralError;
use crate::schema::*;
use serde_json::Value;

macro_rules! impl_decode_for_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Decode for $ty {
                fn expected() -> String {
                    enum_expected::<$ty>()
                }

                fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
                    decode_enum(value, cx)
                }
            }
        )+
    };
}

impl_decode_for_enum!(ModFamily, Os, ModOptionType);

impl Decode for InstallDataDefinition {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            version: object.required("version", cx)?,
            mods: object.required("mods", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}

impl Decode for ModDefinition {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            family: object.required("family", cx)?,
            name: object.required("name", cx)?,
            target: object.required("target", cx)?,
            data_name: object.required("dataname", cx)?,
            identifiers: object.required("identifiers", cx)?,
            submods: object.required("submods", cx)?,
            mod_option_groups: object.optional("modOptionGroups", cx)?,
            bundle_name: object.optional("CFBundleName", cx)?,
            bundle_identifier: object.optional("CFBundleIdentifier", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}

impl Decode for SubmodDefinition {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            name: object.required("name", cx)?,
            description_id: object.optional("descriptionID", cx)?,
            files: object.required("files", cx)?,
            file_overrides: object.required("fileOverrides", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}

impl Decode for FileDefinition {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            name: object.required("name", cx)?,
            url: object.optional("url", cx)?,
            priority: object.required("priority", cx)?,
            relative_extraction_path: object.optional("relativeExtractionPath", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}

impl Decode for FileOverrideDefinition {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            name: object.required("name", cx)?,
            id: object.optional("id", cx)?,
            os: object.required("os", cx)?,
            unity: object.optional("unity", cx)?,
            steam: object.optional("steam", cx)?,
            url: object.required("url", cx)?,
            target_checksums: object.optional("targetChecksums", cx)?,
            relative_extraction_path: object.optional("relativeExtractionPath", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}

impl Decode for TargetChecksum {
    fn expected() -> String {
        "[path, checksum] array of 2 strings".to_string()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(cx.type_mismatch(Self::expected(), other)),
        };
        if items.len() != 2 {
            return Err(cx.corrupted(format!(
                "expected a [path, checksum] pair but found {} element(s)",
                items.len()
            )));
        }
        let path = cx.nested(0usize, |cx| String::decode(&items[0], cx))?;
        let checksum = cx.nested(1usize, |cx| String::decode(&items[1], cx))?;
        Ok(TargetChecksum(path, checksum))
    }
}

impl Decode for ModOptionGroup {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            name: object.required("name", cx)?,
            option_type: object.required("type", cx)?,
            radio: object.optional("radio", cx)?,
            check_box: object.optional("checkBox", cx)?,
            submods: object.optional("submods", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}

impl Decode for ModOptionEntry {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            name: object.required("name", cx)?,
            description: object.required("description", cx)?,
            data: object.optional("data", cx)?,
            is_global: object.optional("isGlobal", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}

impl Decode for ModOptionFileDefinition {
    fn expected() -> String {
        object_expected::<Self>()
    }

    fn decode(value: &Value, cx: &mut DecodeContext) -> Result<Self, StructuralError> {
        let object = ObjectReader::open::<Self>(value, cx)?;
        let decoded = Self {
            url: object.required("url", cx)?,
            relative_extraction_path: object.required("relativeExtractionPath", cx)?,
            priority: object.required("priority", cx)?,
        };
        object.finish(cx);
        Ok(decoded)
    }
}
