//! Tag Data - the persisted interchange format
//!
//! The tree types plus their conversions from primitives.
//! Typed access lives in tag_operations.rs, encoding in tag_codec.rs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One value in a persisted tag tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<u8>),
    List(Vec<Tag>),
    Compound(TagCompound),
}

/// Keyed branch of a tag tree
///
/// Keys are kept sorted so two saves of the same state encode to the same
/// bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagCompound {
    pub(crate) entries: BTreeMap<String, Tag>,
}

impl Tag {
    /// Empty compound, the value written for an extension with nothing to say
    pub fn empty() -> Self {
        Tag::Compound(TagCompound::new())
    }

    /// Name of the variant, used in malformed-tag errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Tag::Byte(_) => "byte",
            Tag::Short(_) => "short",
            Tag::Int(_) => "int",
            Tag::Long(_) => "long",
            Tag::Float(_) => "float",
            Tag::Double(_) => "double",
            Tag::String(_) => "string",
            Tag::ByteArray(_) => "byte_array",
            Tag::List(_) => "list",
            Tag::Compound(_) => "compound",
        }
    }

    pub fn is_empty_compound(&self) -> bool {
        matches!(self, Tag::Compound(compound) if compound.is_empty())
    }
}

impl From<TagCompound> for Tag {
    fn from(compound: TagCompound) -> Self {
        Tag::Compound(compound)
    }
}

impl From<i8> for Tag {
    fn from(value: i8) -> Self {
        Tag::Byte(value)
    }
}

impl From<bool> for Tag {
    fn from(value: bool) -> Self {
        Tag::Byte(value as i8)
    }
}

impl From<i16> for Tag {
    fn from(value: i16) -> Self {
        Tag::Short(value)
    }
}

impl From<i32> for Tag {
    fn from(value: i32) -> Self {
        Tag::Int(value)
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Tag::Long(value)
    }
}

impl From<f32> for Tag {
    fn from(value: f32) -> Self {
        Tag::Float(value)
    }
}

impl From<f64> for Tag {
    fn from(value: f64) -> Self {
        Tag::Double(value)
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::String(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_string())
    }
}

impl From<Vec<u8>> for Tag {
    fn from(value: Vec<u8>) -> Self {
        Tag::ByteArray(value)
    }
}

impl From<Vec<Tag>> for Tag {
    fn from(value: Vec<Tag>) -> Self {
        Tag::List(value)
    }
}
