//! Compressors and the chunk codec.
//!
//! A compressor is a named, parameterised, reversible transform over the bytes of a chunk ([`BytesToBytesCodecTraits`]).
//! Compressors are created from the `compressor` descriptor of the array metadata by matching its `id` against the registered [`CompressorPlugin`]s.
//!
//! The [`ChunkCodec`] composes byte order conversion and an optional compressor to encode or decode whole chunks, and synthesises a chunk of the fill value when a chunk has never been written.
//!
//! Supported compressors:
//!  - `zlib` (feature `zlib`),
//!  - `gzip` (feature `gzip`), and
//!  - `zstd` (feature `zstd`).

pub mod bytes_to_bytes;
mod chunk_codec;

pub use chunk_codec::ChunkCodec;

#[cfg(feature = "gzip")]
pub use bytes_to_bytes::gzip::{GzipCodec, GzipCodecConfiguration, GzipCompressionLevel};
#[cfg(feature = "zlib")]
pub use bytes_to_bytes::zlib::{ZlibCodec, ZlibCodecConfiguration, ZlibCompressionLevel};
#[cfg(feature = "zstd")]
pub use bytes_to_bytes::zstd::{ZstdCodec, ZstdCodecConfiguration, ZstdCompressionLevel};

use std::sync::Arc;

use thiserror::Error;

use crate::{
    metadata::v2::MetadataV2,
    plugin::{Plugin, PluginCreateError},
    storage::StorageError,
};

/// A compressor plugin.
pub type CompressorPlugin = Plugin<Arc<dyn BytesToBytesCodecTraits>>;
inventory::collect!(CompressorPlugin);

/// Traits for a compressor, a `bytes->bytes` codec.
pub trait BytesToBytesCodecTraits: core::fmt::Debug + Send + Sync {
    /// Create the compressor descriptor written to the `compressor` field of the array metadata.
    fn create_metadata(&self) -> MetadataV2;

    /// Encode bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails.
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails.
    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError>;
}

/// Create a compressor from a `compressor` descriptor.
///
/// # Errors
/// Returns [`PluginCreateError::Unsupported`] if no registered compressor matches the descriptor `id`, or another [`PluginCreateError`] if its parameters are invalid.
pub fn compressor_from_metadata(
    metadata: &MetadataV2,
) -> Result<Arc<dyn BytesToBytesCodecTraits>, PluginCreateError> {
    for plugin in inventory::iter::<CompressorPlugin> {
        if plugin.match_name(metadata.id()) {
            return plugin.create(metadata);
        }
    }
    Err(PluginCreateError::Unsupported {
        name: metadata.id().to_string(),
        plugin_type: "compressor".to_string(),
    })
}

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The decoded size of a chunk did not match what was expected.
    #[error("the size of a decoded chunk is {_0}, expected {_1}")]
    UnexpectedChunkDecodedSize(usize, u64),
    /// The size of the bytes to encode did not match the chunk size.
    #[error("the size of the bytes to encode is {_0}, expected {_1}")]
    InvalidInputSize(usize, u64),
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for CodecError {
    fn from(err_string: &str) -> Self {
        Self::Other(err_string.to_string())
    }
}

impl From<String> for CodecError {
    fn from(err_string: String) -> Self {
        Self::Other(err_string)
    }
}
