//! Tag Module
//!
//! Nested, self-describing key/value tree used as the interchange format
//! between extensions and a host's durable storage.

pub mod tag_codec;
pub mod tag_data;
pub mod tag_operations;

pub use tag_codec::{decode_binary, decode_json, encode_binary, encode_json, ensure_json_safe};
pub use tag_data::{Tag, TagCompound};
