//! Chunk key encoding.
//!
//! The key of a chunk is its chunk grid indices joined by a [`ChunkKeySeparator`], e.g. `1.2.3.42`.
//! A zero-dimensional array has the single chunk key `0`.

use derive_more::Display;
use serde::Deserialize;

use crate::storage::StoreKey;

/// A chunk key separator, the `dimension_separator` of an array.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ChunkKeySeparator {
    /// The slash '/' character.
    #[display("/")]
    Slash,
    /// The dot '.' character.
    #[display(".")]
    Dot,
}

impl TryFrom<char> for ChunkKeySeparator {
    type Error = char;

    fn try_from(separator: char) -> Result<Self, Self::Error> {
        match separator {
            '/' => Ok(Self::Slash),
            '.' => Ok(Self::Dot),
            _ => Err(separator),
        }
    }
}

impl serde::Serialize for ChunkKeySeparator {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            ChunkKeySeparator::Slash => s.serialize_char('/'),
            ChunkKeySeparator::Dot => s.serialize_char('.'),
        }
    }
}

impl<'de> Deserialize<'de> for ChunkKeySeparator {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        if let serde_json::Value::String(separator) = value {
            if separator == "/" {
                return Ok(ChunkKeySeparator::Slash);
            } else if separator == "." {
                return Ok(ChunkKeySeparator::Dot);
            }
        }
        Err(serde::de::Error::custom(
            "chunk key separator must be a `.` or `/`.",
        ))
    }
}

/// The chunk key encoding of a Zarr V2 array.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ChunkKeyEncoding {
    separator: ChunkKeySeparator,
}

impl ChunkKeyEncoding {
    /// Create a new chunk key encoding with separator `separator`.
    #[must_use]
    pub const fn new(separator: ChunkKeySeparator) -> Self {
        Self { separator }
    }

    /// Return the separator.
    #[must_use]
    pub const fn separator(&self) -> ChunkKeySeparator {
        self.separator
    }

    /// Encode chunk grid indices into a store key relative to the array prefix.
    #[must_use]
    pub fn encode(&self, chunk_grid_indices: &[u64]) -> StoreKey {
        if chunk_grid_indices.is_empty() {
            return StoreKey::new_unchecked("0");
        }
        let key = itertools::join(chunk_grid_indices, &self.separator.to_string());
        StoreKey::new_unchecked(key)
    }
}

impl Default for ChunkKeyEncoding {
    fn default() -> Self {
        Self::new(ChunkKeySeparator::Dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_key_encoding_dot() {
        let encoding = ChunkKeyEncoding::default();
        assert_eq!(encoding.encode(&[1, 2, 3, 42]).as_str(), "1.2.3.42");
        assert_eq!(encoding.encode(&[0]).as_str(), "0");
        assert_eq!(encoding.encode(&[]).as_str(), "0");
    }

    #[test]
    fn chunk_key_encoding_slash() {
        let encoding = ChunkKeyEncoding::new(ChunkKeySeparator::Slash);
        assert_eq!(encoding.encode(&[1, 2, 3, 42]).as_str(), "1/2/3/42");
    }

    #[test]
    fn chunk_key_separator_serde() {
        assert_eq!(
            serde_json::to_string(&ChunkKeySeparator::Slash).unwrap(),
            r#""/""#
        );
        assert_eq!(
            serde_json::from_str::<ChunkKeySeparator>(r#"".""#).unwrap(),
            ChunkKeySeparator::Dot
        );
        assert!(serde_json::from_str::<ChunkKeySeparator>(r#""-""#).is_err());
        assert_eq!(ChunkKeySeparator::try_from('/'), Ok(ChunkKeySeparator::Slash));
        assert_eq!(ChunkKeySeparator::try_from('x'), Err('x'));
    }
}
