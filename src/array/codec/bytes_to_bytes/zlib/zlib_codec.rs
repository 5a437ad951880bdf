use std::{
    io::{Cursor, Read},
    sync::Arc,
};

use flate2::bufread::{ZlibDecoder, ZlibEncoder};

use crate::{
    array::codec::{BytesToBytesCodecTraits, CodecError, CompressorPlugin},
    metadata::v2::MetadataV2,
    plugin::PluginCreateError,
};

use super::{
    ZlibCodecConfiguration, ZlibCodecConfigurationV1, ZlibCompressionLevel,
    ZlibCompressionLevelError,
};

const IDENTIFIER: &str = "zlib";

// Register the codec.
inventory::submit! {
    CompressorPlugin::new(IDENTIFIER, is_name_zlib, create_codec_zlib)
}

fn is_name_zlib(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_zlib(
    metadata: &MetadataV2,
) -> Result<Arc<dyn BytesToBytesCodecTraits>, PluginCreateError> {
    let configuration: ZlibCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginCreateError::metadata_invalid(IDENTIFIER, "compressor", metadata))?;
    Ok(Arc::new(ZlibCodec::new_with_configuration(&configuration)))
}

/// A `zlib` codec implementation.
#[derive(Clone, Debug)]
pub struct ZlibCodec {
    compression_level: ZlibCompressionLevel,
}

impl ZlibCodec {
    /// Create a new `zlib` codec.
    ///
    /// # Errors
    /// Returns [`ZlibCompressionLevelError`] if `compression_level` is not valid.
    pub fn new(compression_level: u32) -> Result<Self, ZlibCompressionLevelError> {
        let compression_level: ZlibCompressionLevel = compression_level.try_into()?;
        Ok(Self { compression_level })
    }

    /// Create a new `zlib` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &ZlibCodecConfiguration) -> Self {
        let ZlibCodecConfiguration::V1(configuration) = configuration;
        Self {
            compression_level: configuration.level,
        }
    }
}

impl BytesToBytesCodecTraits for ZlibCodec {
    fn create_metadata(&self) -> MetadataV2 {
        let configuration = ZlibCodecConfigurationV1::new(self.compression_level);
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &configuration)
            .unwrap_or_else(|_| MetadataV2::new(IDENTIFIER))
    }

    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = ZlibEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level.as_u32()),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut decoder = ZlibDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
