//! The `zstd` compressor.
//!
//! Applies [Zstandard](https://facebook.github.io/zstd/) compression, optionally with a content checksum.
//!
//! Compressor descriptor example:
//! ```json
//! {
//!     "id": "zstd",
//!     "level": 3,
//!     "checksum": false
//! }
//! ```

mod zstd_codec;
mod zstd_configuration;

pub use zstd_codec::ZstdCodec;
pub use zstd_configuration::{
    ZstdCodecConfiguration, ZstdCodecConfigurationV1, ZstdCompressionLevel,
    ZstdCompressionLevelError,
};
