use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wrapper to handle various versions of `zlib` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum ZlibCodecConfiguration {
    /// Version 1.0.
    V1(ZlibCodecConfigurationV1),
}

/// Configuration parameters for the `zlib` codec (version 1.0).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ZlibCodecConfigurationV1 {
    /// The compression level.
    pub level: ZlibCompressionLevel,
}

impl ZlibCodecConfigurationV1 {
    /// Create a new `zlib` codec configuration given a [`ZlibCompressionLevel`].
    #[must_use]
    pub const fn new(level: ZlibCompressionLevel) -> Self {
        Self { level }
    }
}

/// A `zlib` compression level, an integer from 0 (no compression) to 9 (best compression).
#[derive(Serialize, Clone, Copy, Eq, PartialEq, Debug)]
pub struct ZlibCompressionLevel(u32);

/// An invalid `zlib` compression level.
#[derive(Debug, Error)]
#[error("invalid zlib compression level {0}, must be 0-9")]
pub struct ZlibCompressionLevelError(u32);

impl ZlibCompressionLevel {
    /// The compression level as a `u32`.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ZlibCompressionLevel {
    type Error = ZlibCompressionLevelError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        if level <= 9 {
            Ok(Self(level))
        } else {
            Err(ZlibCompressionLevelError(level))
        }
    }
}

impl<'de> Deserialize<'de> for ZlibCompressionLevel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let level = serde_json::Number::deserialize(d)?;
        level
            .as_u64()
            .and_then(|level| u32::try_from(level).ok())
            .and_then(|level| Self::try_from(level).ok())
            .ok_or_else(|| {
                serde::de::Error::custom("zlib compression level must be an integer between 0 and 9")
            })
    }
}
