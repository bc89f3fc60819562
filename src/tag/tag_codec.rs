//! Tag Codec - byte and text encodings of a tag tree
//!
//! Binary form is bincode and is lossless for every value. Text form is JSON,
//! which has no NaN or infinity, so trees holding non-finite floats are
//! refused rather than written as `null`.

use super::tag_data::{Tag, TagCompound};
use crate::persistence::{PersistenceError, PersistenceResult};

/// Encode a compound to compact bytes
pub fn encode_binary(compound: &TagCompound) -> PersistenceResult<Vec<u8>> {
    bincode::serialize(compound).map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Decode a compound previously produced by [`encode_binary`]
pub fn decode_binary(bytes: &[u8]) -> PersistenceResult<TagCompound> {
    bincode::deserialize(bytes).map_err(|e| PersistenceError::DeserializationError(e.to_string()))
}

/// Encode a compound as pretty JSON, mainly for inspection and debugging
pub fn encode_json(compound: &TagCompound) -> PersistenceResult<String> {
    ensure_json_safe(compound)?;
    serde_json::to_string_pretty(compound)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn decode_json(text: &str) -> PersistenceResult<TagCompound> {
    serde_json::from_str(text).map_err(|e| PersistenceError::DeserializationError(e.to_string()))
}

/// Fail with the path of the first float JSON cannot represent
pub fn ensure_json_safe(compound: &TagCompound) -> PersistenceResult<()> {
    for (key, tag) in compound.iter() {
        check_finite(tag, key)?;
    }
    Ok(())
}

fn check_finite(tag: &Tag, path: &str) -> PersistenceResult<()> {
    let finite = match tag {
        Tag::Float(value) => value.is_finite(),
        Tag::Double(value) => value.is_finite(),
        Tag::List(items) => {
            for (index, item) in items.iter().enumerate() {
                check_finite(item, &format!("{}[{}]", path, index))?;
            }
            true
        }
        Tag::Compound(compound) => {
            for (key, item) in compound.iter() {
                check_finite(item, &format!("{}.{}", path, key))?;
            }
            true
        }
        _ => true,
    };

    if finite {
        Ok(())
    } else {
        Err(PersistenceError::SerializationError(format!(
            "non-finite {} at '{}' has no JSON form",
            tag.type_name(),
            path
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    fn sample() -> TagCompound {
        TagCompound::new()
            .with("score", TagCompound::new().with("value", 10))
            .with("flags", vec![Tag::Byte(1), Tag::Byte(0)])
            .with("raw", vec![0u8, 255, 7])
            .with("ratio", 0.25f64)
    }

    #[test]
    fn test_binary_encoding_is_deterministic() {
        let first = encode_binary(&sample()).expect("encode should succeed");
        let second = encode_binary(&sample()).expect("encode should succeed");
        assert_eq!(first, second);
        assert_eq!(decode_binary(&first).expect("decode should succeed"), sample());
    }

    #[test]
    fn test_json_preserves_variants() {
        let text = encode_json(&sample()).expect("encode should succeed");
        let decoded = decode_json(&text).expect("decode should succeed");
        assert_eq!(decoded.get("ratio"), Some(&Tag::Double(0.25)));
        assert_eq!(decoded.get("raw"), Some(&Tag::ByteArray(vec![0, 255, 7])));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decode_json("{ not json").is_err());
        assert!(decode_binary(&[0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn test_json_refuses_non_finite_floats() {
        let nested = TagCompound::new().with(
            "stats",
            TagCompound::new().with("speeds", vec![Tag::Double(1.0), Tag::Double(f64::INFINITY)]),
        );
        assert_eq!(
            encode_json(&nested),
            Err(PersistenceError::SerializationError(
                "non-finite double at 'stats.speeds[1]' has no JSON form".to_string()
            ))
        );
        assert!(encode_json(&TagCompound::new().with("f", f32::NAN)).is_err());
    }

    #[test]
    fn test_binary_keeps_non_finite_floats() {
        let compound = TagCompound::new()
            .with("d", f64::INFINITY)
            .with("f", f32::NEG_INFINITY);
        let bytes = encode_binary(&compound).expect("encode should succeed");
        assert_eq!(decode_binary(&bytes).expect("decode should succeed"), compound);
    }
}
