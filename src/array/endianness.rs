//! Byte order.
//!
//! Decoded chunks are held in the native byte order of the CPU and stored in the byte order declared by the array `dtype`.

use derive_more::Display;

use super::DataType;

/// The byte order of each element in an array, either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum Endianness {
    /// Little endian.
    Little,

    /// Big endian.
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Reverse the byte order of every element of `data_type` in `bytes`, in place.
///
/// Data types without a byte order are left untouched.
/// Fixed-width text is swapped per code point.
pub fn reverse_endianness(bytes: &mut [u8], data_type: &DataType) {
    if let Some(width) = data_type.swap_width() {
        bytes.chunks_exact_mut(width).for_each(<[u8]>::reverse);
    }
}
