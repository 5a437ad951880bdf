//! Bytes to bytes codecs (compressors).

#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "zlib")]
pub mod zlib;
#[cfg(feature = "zstd")]
pub mod zstd;
