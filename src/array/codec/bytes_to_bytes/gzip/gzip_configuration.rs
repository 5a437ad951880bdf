use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wrapper to handle various versions of `gzip` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum GzipCodecConfiguration {
    /// Version 1.0.
    V1(GzipCodecConfigurationV1),
}

/// Configuration parameters for the `gzip` codec (version 1.0).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct GzipCodecConfigurationV1 {
    /// The compression level.
    pub level: GzipCompressionLevel,
}

impl GzipCodecConfigurationV1 {
    /// Create a new `gzip` codec configuration given a [`GzipCompressionLevel`].
    #[must_use]
    pub const fn new(level: GzipCompressionLevel) -> Self {
        Self { level }
    }
}

/// A `gzip` compression level, an integer from 0 to 9.
#[derive(Serialize, Clone, Copy, Eq, PartialEq, Debug)]
pub struct GzipCompressionLevel(u32);

/// An invalid `gzip` compression level.
#[derive(Debug, Error)]
#[error("invalid gzip compression level {0}, must be 0-9")]
pub struct GzipCompressionLevelError(u32);

impl GzipCompressionLevel {
    /// The compression level as a `u32`.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for GzipCompressionLevel {
    type Error = GzipCompressionLevelError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        if level <= 9 {
            Ok(Self(level))
        } else {
            Err(GzipCompressionLevelError(level))
        }
    }
}

impl<'de> Deserialize<'de> for GzipCompressionLevel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let level = serde_json::Number::deserialize(d)?;
        level
            .as_u64()
            .and_then(|level| u32::try_from(level).ok())
            .and_then(|level| Self::try_from(level).ok())
            .ok_or_else(|| {
                serde::de::Error::custom("gzip compression level must be an integer between 0 and 9")
            })
    }
}
