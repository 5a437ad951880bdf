//! The `gzip` compressor.
//!
//! Applies gzip compression with a level from 0 to 9.
//!
//! Compressor descriptor example:
//! ```json
//! {
//!     "id": "gzip",
//!     "level": 5
//! }
//! ```

mod gzip_codec;
mod gzip_configuration;

pub use gzip_codec::GzipCodec;
pub use gzip_configuration::{
    GzipCodecConfiguration, GzipCodecConfigurationV1, GzipCompressionLevel,
    GzipCompressionLevelError,
};

#[cfg(test)]
mod tests {
    use crate::array::codec::BytesToBytesCodecTraits;

    use super::*;

    const JSON_VALID: &str = r#"{
        "level": 1
    }"#;

    #[test]
    fn codec_gzip_round_trip1() {
        let elements: Vec<u16> = (0..32).collect();
        let bytes = bytemuck::cast_slice::<u16, u8>(&elements).to_vec();

        let configuration: GzipCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        let codec = GzipCodec::new_with_configuration(&configuration);

        let encoded = codec.encode(bytes.clone()).unwrap();
        assert_eq!(&encoded[..2], &[0x1f, 0x8b]);
        let decoded = codec.decode(encoded).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_gzip_decode_invalid() {
        let codec = GzipCodec::new(5).unwrap();
        assert!(codec.decode(vec![0, 1, 2, 3]).is_err());
    }
}
