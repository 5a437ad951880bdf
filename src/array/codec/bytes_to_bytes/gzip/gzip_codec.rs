use std::{
    io::{Cursor, Read},
    sync::Arc,
};

use flate2::bufread::{GzDecoder, GzEncoder};

use crate::{
    array::codec::{BytesToBytesCodecTraits, CodecError, CompressorPlugin},
    metadata::v2::MetadataV2,
    plugin::PluginCreateError,
};

use super::{
    GzipCodecConfiguration, GzipCodecConfigurationV1, GzipCompressionLevel,
    GzipCompressionLevelError,
};

const IDENTIFIER: &str = "gzip";

// Register the codec.
inventory::submit! {
    CompressorPlugin::new(IDENTIFIER, is_name_gzip, create_codec_gzip)
}

fn is_name_gzip(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_gzip(
    metadata: &MetadataV2,
) -> Result<Arc<dyn BytesToBytesCodecTraits>, PluginCreateError> {
    let configuration: GzipCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginCreateError::metadata_invalid(IDENTIFIER, "compressor", metadata))?;
    Ok(Arc::new(GzipCodec::new_with_configuration(&configuration)))
}

/// A `gzip` codec implementation.
#[derive(Clone, Debug)]
pub struct GzipCodec {
    compression_level: GzipCompressionLevel,
}

impl GzipCodec {
    /// Create a new `gzip` codec.
    ///
    /// # Errors
    /// Returns [`GzipCompressionLevelError`] if `compression_level` is not valid.
    pub fn new(compression_level: u32) -> Result<Self, GzipCompressionLevelError> {
        let compression_level: GzipCompressionLevel = compression_level.try_into()?;
        Ok(Self { compression_level })
    }

    /// Create a new `gzip` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &GzipCodecConfiguration) -> Self {
        let GzipCodecConfiguration::V1(configuration) = configuration;
        Self {
            compression_level: configuration.level,
        }
    }
}

impl BytesToBytesCodecTraits for GzipCodec {
    fn create_metadata(&self) -> MetadataV2 {
        let configuration = GzipCodecConfigurationV1::new(self.compression_level);
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &configuration)
            .unwrap_or_else(|_| MetadataV2::new(IDENTIFIER))
    }

    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = GzEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level.as_u32()),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut decoder = GzDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
