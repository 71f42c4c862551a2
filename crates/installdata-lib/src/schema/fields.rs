/// One recognized key of a schema record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// A required key must be present and non-null
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Declares the legal shape of a JSON object.
/// The pedantic decoder treats `FIELDS` as the complete list of keys allowed in the object,
/// and reads each one as required or optional exactly as declared here.
pub trait Schema {
    const TYPE_NAME: &'static str;
    const FIELDS: &'static [FieldSpec];

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    fn recognizes(name: &str) -> bool {
        Self::field(name).is_some()
    }
}

/// A closed set of string literals.
pub trait SchemaEnum: Sized + Copy + 'static {
    const TYPE_NAME: &'static str;
    const VALUES: &'static [&'static str];

    fn as_str(&self) -> &'static str;

    fn from_wire(value: &str) -> Option<Self>;
}
