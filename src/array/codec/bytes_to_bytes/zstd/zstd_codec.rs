use std::{io::Write, sync::Arc};

use zstd::zstd_safe;

use crate::{
    array::codec::{BytesToBytesCodecTraits, CodecError, CompressorPlugin},
    metadata::v2::MetadataV2,
    plugin::PluginCreateError,
};

use super::{ZstdCodecConfiguration, ZstdCodecConfigurationV1, ZstdCompressionLevel};

const IDENTIFIER: &str = "zstd";

// Register the codec.
inventory::submit! {
    CompressorPlugin::new(IDENTIFIER, is_name_zstd, create_codec_zstd)
}

fn is_name_zstd(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_zstd(
    metadata: &MetadataV2,
) -> Result<Arc<dyn BytesToBytesCodecTraits>, PluginCreateError> {
    let configuration: ZstdCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginCreateError::metadata_invalid(IDENTIFIER, "compressor", metadata))?;
    Ok(Arc::new(ZstdCodec::new_with_configuration(&configuration)))
}

/// A Zstd codec implementation.
#[derive(Clone, Debug)]
pub struct ZstdCodec {
    compression: zstd_safe::CompressionLevel,
    checksum: bool,
}

impl ZstdCodec {
    /// Create a new `Zstd` codec.
    #[must_use]
    pub fn new(compression: ZstdCompressionLevel, checksum: bool) -> Self {
        Self {
            compression: compression.into(),
            checksum,
        }
    }

    /// Create a new `Zstd` codec from configuration.
    #[must_use]
    pub fn new_with_configuration(configuration: &ZstdCodecConfiguration) -> Self {
        let ZstdCodecConfiguration::V1(configuration) = configuration;
        Self::new(configuration.level, configuration.checksum)
    }
}

impl BytesToBytesCodecTraits for ZstdCodec {
    fn create_metadata(&self) -> MetadataV2 {
        let configuration =
            ZstdCodecConfigurationV1::new(self.compression.into(), self.checksum);
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &configuration)
            .unwrap_or_else(|_| MetadataV2::new(IDENTIFIER))
    }

    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        if !self.checksum {
            return zstd::encode_all(decoded_value.as_slice(), self.compression)
                .map_err(CodecError::IOError);
        }
        let mut encoder = zstd::Encoder::new(Vec::new(), self.compression)?;
        encoder.include_checksum(true)?;
        encoder.write_all(&decoded_value)?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        zstd::decode_all(encoded_value.as_slice()).map_err(CodecError::IOError)
    }
}
