use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zstd::zstd_safe;

/// A wrapper to handle various versions of `zstd` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum ZstdCodecConfiguration {
    /// Version 1.0.
    V1(ZstdCodecConfigurationV1),
}

/// Configuration parameters for the `zstd` codec (version 1.0).
///
/// Both parameters may be omitted, `level` then defaults to 1 and `checksum` to false.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ZstdCodecConfigurationV1 {
    /// The compression level.
    #[serde(default)]
    pub level: ZstdCompressionLevel,
    /// Write a content checksum into each frame, verified on decoding.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checksum: bool,
}

impl ZstdCodecConfigurationV1 {
    /// Create a new `zstd` codec configuration.
    #[must_use]
    pub const fn new(level: ZstdCompressionLevel, checksum: bool) -> Self {
        Self { level, checksum }
    }
}

/// A `zstd` compression level.
///
/// Zero selects the library default level. Negative levels trade ratio for speed.
/// Decoding is unaffected by the level.
#[derive(Serialize, Clone, Copy, Eq, PartialEq, Debug)]
pub struct ZstdCompressionLevel(zstd_safe::CompressionLevel);

/// An out of range `zstd` compression level.
#[derive(Debug, Error)]
#[error("invalid zstd compression level {0}, must be {min}-{max}", min = zstd_safe::min_c_level(), max = zstd_safe::max_c_level())]
pub struct ZstdCompressionLevelError(i64);

impl Default for ZstdCompressionLevel {
    fn default() -> Self {
        Self(1)
    }
}

impl ZstdCompressionLevel {
    /// Create a new `zstd` compression level.
    ///
    /// Levels outside the range supported by the library are clamped when compressing.
    #[must_use]
    pub const fn new(level: zstd_safe::CompressionLevel) -> Self {
        Self(level)
    }
}

impl TryFrom<i64> for ZstdCompressionLevel {
    type Error = ZstdCompressionLevelError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        let range = i64::from(zstd_safe::min_c_level())..=i64::from(zstd_safe::max_c_level());
        if range.contains(&level) {
            zstd_safe::CompressionLevel::try_from(level)
                .map(Self)
                .map_err(|_| ZstdCompressionLevelError(level))
        } else {
            Err(ZstdCompressionLevelError(level))
        }
    }
}

impl<'de> Deserialize<'de> for ZstdCompressionLevel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let level = serde_json::Number::deserialize(d)?;
        level
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("zstd compression level must be an integer"))
            .and_then(|level| Self::try_from(level).map_err(serde::de::Error::custom))
    }
}

impl From<zstd_safe::CompressionLevel> for ZstdCompressionLevel {
    fn from(level: zstd_safe::CompressionLevel) -> Self {
        Self(level)
    }
}

impl From<ZstdCompressionLevel> for zstd_safe::CompressionLevel {
    fn from(level: ZstdCompressionLevel) -> Self {
        level.0
    }
}
