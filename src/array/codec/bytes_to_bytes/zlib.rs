//! The `zlib` compressor.
//!
//! Applies zlib (deflate with a zlib header and adler-32 trailer) compression with a level from 0 to 9.
//!
//! Compressor descriptor example:
//! ```json
//! {
//!     "id": "zlib",
//!     "level": 1
//! }
//! ```

mod zlib_codec;
mod zlib_configuration;

pub use zlib_codec::ZlibCodec;
pub use zlib_configuration::{
    ZlibCodecConfiguration, ZlibCodecConfigurationV1, ZlibCompressionLevel,
    ZlibCompressionLevelError,
};
