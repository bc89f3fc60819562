//! Tag Operations - typed access into compounds
//!
//! Accessors return `MissingKey` when a key is absent and `MalformedTag` when
//! it holds the wrong variant, so `deserialize` implementations can lean on `?`.

use super::tag_data::{Tag, TagCompound};
use crate::error::{ExtensionError, ExtensionResult, OptionExt};

macro_rules! typed_getter {
    ($name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub fn $name(&self, key: &str) -> ExtensionResult<$ty> {
            match self.get(key).or_missing(key)? {
                Tag::$variant(value) => Ok(value.clone()),
                other => Err(ExtensionError::malformed(key, $expected, other.type_name())),
            }
        }
    };
}

impl TagCompound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
        self.entries.get_mut(key)
    }

    /// Insert a value, returning whatever was stored under the key before
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Tag>) -> Option<Tag> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.entries.remove(key)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Tag>) -> Self {
        self.insert(key, value);
        self
    }

    /// Copy every entry of `other` into self, overwriting on collision
    pub fn merge(&mut self, other: TagCompound) {
        self.entries.extend(other.entries);
    }

    typed_getter!(get_byte, Byte, i8, "byte");
    typed_getter!(get_short, Short, i16, "short");
    typed_getter!(get_int, Int, i32, "int");
    typed_getter!(get_long, Long, i64, "long");
    typed_getter!(get_float, Float, f32, "float");
    typed_getter!(get_double, Double, f64, "double");
    typed_getter!(get_string, String, String, "string");
    typed_getter!(get_byte_array, ByteArray, Vec<u8>, "byte_array");

    pub fn get_bool(&self, key: &str) -> ExtensionResult<bool> {
        Ok(self.get_byte(key)? != 0)
    }

    pub fn get_compound(&self, key: &str) -> ExtensionResult<&TagCompound> {
        match self.get(key).or_missing(key)? {
            Tag::Compound(compound) => Ok(compound),
            other => Err(ExtensionError::malformed(key, "compound", other.type_name())),
        }
    }

    pub fn get_list(&self, key: &str) -> ExtensionResult<&[Tag]> {
        match self.get(key).or_missing(key)? {
            Tag::List(list) => Ok(list.as_slice()),
            other => Err(ExtensionError::malformed(key, "list", other.type_name())),
        }
    }

    /// List whose elements must all be compounds ("sequence of trees")
    pub fn get_compound_list(&self, key: &str) -> ExtensionResult<Vec<&TagCompound>> {
        self.get_list(key)?
            .iter()
            .map(|item| match item {
                Tag::Compound(compound) => Ok(compound),
                other => Err(ExtensionError::malformed(key, "compound", other.type_name())),
            })
            .collect()
    }
}

impl Tag {
    /// View this tag as a compound or report it as malformed under `key`
    pub fn as_compound(&self, key: &str) -> ExtensionResult<&TagCompound> {
        match self {
            Tag::Compound(compound) => Ok(compound),
            other => Err(ExtensionError::malformed(key, "compound", other.type_name())),
        }
    }
}

impl FromIterator<(String, Tag)> for TagCompound {
    fn from_iter<I: IntoIterator<Item = (String, Tag)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TagCompound {
    type Item = (String, Tag);
    type IntoIter = std::collections::btree_map::IntoIter<String, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
