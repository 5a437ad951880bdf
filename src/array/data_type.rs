//! Data types.
//!
//! The closed set of element kinds an array can hold.
//! Each kind has a fixed element size in bytes, see [`DataType::size`].

use base64::{prelude::BASE64_STANDARD, Engine};
use derive_more::From;
use thiserror::Error;

use crate::metadata::v2::FillValueMetadataV2;

use super::FillValue;

/// A data type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[rustfmt::skip]
pub enum DataType {
    /// `|b1` Boolean, stored as a single byte that is `0` or `1`.
    Bool,
    /// `|i1` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `i2` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `i4` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `i8` Integer in `[-2^63, 2^63-1]`.
    Int64,
    /// `|u1` Integer in `[0, 2^8-1]`.
    UInt8,
    /// `u2` Integer in `[0, 2^16-1]`.
    UInt16,
    /// `u4` Integer in `[0, 2^32-1]`.
    UInt32,
    /// `u8` Integer in `[0, 2^64-1]`.
    UInt64,
    /// `f4` IEEE 754 single-precision floating point.
    Float32,
    /// `f8` IEEE 754 double-precision floating point.
    Float64,
    /// `|S<n>` Fixed-width byte string of `n` bytes, zero padded.
    FixedBytes(usize),
    /// `U<n>` Fixed-width text of `n` UTF-32 code points, zero padded.
    FixedString(usize),
}

/// An unsupported data type error.
#[derive(Debug, Error, From)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

/// A fill value metadata incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueMetadataError(DataType, FillValueMetadataV2);

/// A fill value incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueError(DataType, FillValue);

impl IncompatibleFillValueError {
    /// Create a new incompatible fill value error.
    #[must_use]
    pub const fn new(data_type: DataType, fill_value: FillValue) -> Self {
        Self(data_type, fill_value)
    }
}

impl DataType {
    /// Returns the name of the data type, e.g. `int32` or `fixed_string(8)`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Bool => "bool".to_string(),
            Self::Int8 => "int8".to_string(),
            Self::Int16 => "int16".to_string(),
            Self::Int32 => "int32".to_string(),
            Self::Int64 => "int64".to_string(),
            Self::UInt8 => "uint8".to_string(),
            Self::UInt16 => "uint16".to_string(),
            Self::UInt32 => "uint32".to_string(),
            Self::UInt64 => "uint64".to_string(),
            Self::Float32 => "float32".to_string(),
            Self::Float64 => "float64".to_string(),
            Self::FixedBytes(n) => format!("fixed_bytes({n})"),
            Self::FixedString(n) => format!("fixed_string({n})"),
        }
    }

    /// Returns the size of one element in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
            Self::FixedBytes(n) => *n,
            Self::FixedString(n) => *n * 4,
        }
    }

    /// Returns the width in bytes of the units swapped when the byte order changes.
    ///
    /// Returns [`None`] for data types without a byte order.
    #[must_use]
    pub const fn swap_width(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 | Self::FixedBytes(_) => None,
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 | Self::FixedString(_) => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
        }
    }

    /// Returns true if the encoded representation of the data type depends on the byte order.
    #[must_use]
    pub const fn has_endianness(&self) -> bool {
        self.swap_width().is_some()
    }

    /// Create a fill value from `fill_value` metadata.
    ///
    /// A `null` fill value is all zero bytes.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueMetadataError`] if the fill value is incompatible with the data type.
    pub fn fill_value_from_metadata(
        &self,
        fill_value: &FillValueMetadataV2,
    ) -> Result<FillValue, IncompatibleFillValueMetadataError> {
        use FillValue as FV;
        use FillValueMetadataV2 as FVM;
        let err = || IncompatibleFillValueMetadataError(*self, fill_value.clone());
        if let FVM::Null = fill_value {
            return Ok(FV::new(vec![0; self.size()]));
        }
        match self {
            Self::Bool => match fill_value {
                FVM::Bool(value) => Ok(FV::from(*value)),
                FVM::Number(number) => match number.as_u64() {
                    Some(0) => Ok(FV::from(false)),
                    Some(1) => Ok(FV::from(true)),
                    _ => Err(err()),
                },
                _ => Err(err()),
            },
            Self::Int8 => Ok(FV::from(fill_value_as_int::<i8>(fill_value).ok_or_else(err)?)),
            Self::Int16 => Ok(FV::from(fill_value_as_int::<i16>(fill_value).ok_or_else(err)?)),
            Self::Int32 => Ok(FV::from(fill_value_as_int::<i32>(fill_value).ok_or_else(err)?)),
            Self::Int64 => Ok(FV::from(fill_value_as_int::<i64>(fill_value).ok_or_else(err)?)),
            Self::UInt8 => Ok(FV::from(fill_value_as_uint::<u8>(fill_value).ok_or_else(err)?)),
            Self::UInt16 => Ok(FV::from(fill_value_as_uint::<u16>(fill_value).ok_or_else(err)?)),
            Self::UInt32 => Ok(FV::from(fill_value_as_uint::<u32>(fill_value).ok_or_else(err)?)),
            Self::UInt64 => Ok(FV::from(fill_value_as_uint::<u64>(fill_value).ok_or_else(err)?)),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float32 => Ok(FV::from(fill_value_as_float(fill_value).ok_or_else(err)? as f32)),
            Self::Float64 => Ok(FV::from(fill_value_as_float(fill_value).ok_or_else(err)?)),
            Self::FixedBytes(n) => {
                let FVM::String(string) = fill_value else {
                    return Err(err());
                };
                let mut bytes = BASE64_STANDARD.decode(string).map_err(|_| err())?;
                if bytes.len() > *n {
                    return Err(err());
                }
                bytes.resize(*n, 0);
                Ok(FV::new(bytes))
            }
            Self::FixedString(n) => {
                let text = match fill_value {
                    FVM::String(string) => string.as_str(),
                    FVM::NaN => "NaN",
                    FVM::Infinity => "Infinity",
                    FVM::NegInfinity => "-Infinity",
                    _ => return Err(err()),
                };
                if text.chars().count() > *n {
                    return Err(err());
                }
                let mut bytes = Vec::with_capacity(self.size());
                for c in text.chars() {
                    bytes.extend_from_slice(&u32::from(c).to_ne_bytes());
                }
                bytes.resize(self.size(), 0);
                Ok(FV::new(bytes))
            }
        }
    }

    /// Create fill value metadata from a fill value.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the size of the fill value does not match the data type, or it holds an invalid element.
    pub fn metadata_fill_value(
        &self,
        fill_value: &FillValue,
    ) -> Result<FillValueMetadataV2, IncompatibleFillValueError> {
        use FillValueMetadataV2 as FVM;
        let err = || IncompatibleFillValueError(*self, fill_value.clone());
        let bytes = fill_value.as_ne_bytes();
        if bytes.len() != self.size() {
            return Err(err());
        }
        let number = |n: serde_json::Number| Ok(FVM::Number(n));
        match self {
            Self::Bool => match bytes {
                [0] => Ok(FVM::Bool(false)),
                [1] => Ok(FVM::Bool(true)),
                _ => Err(err()),
            },
            Self::Int8 => number(i8::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::Int16 => number(i16::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::Int32 => number(i32::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::Int64 => number(i64::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::UInt8 => number(u8::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::UInt16 => number(u16::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::UInt32 => number(u32::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::UInt64 => number(u64::from_ne_bytes(ne(bytes).ok_or_else(err)?).into()),
            Self::Float32 => Ok(float_to_fill_value(f64::from(f32::from_ne_bytes(
                ne(bytes).ok_or_else(err)?,
            )))),
            Self::Float64 => Ok(float_to_fill_value(f64::from_ne_bytes(
                ne(bytes).ok_or_else(err)?,
            ))),
            Self::FixedBytes(_) => Ok(FVM::String(BASE64_STANDARD.encode(bytes))),
            Self::FixedString(_) => {
                let mut text = String::new();
                for code_point in bytes.chunks_exact(4) {
                    let code_point = u32::from_ne_bytes(ne(code_point).ok_or_else(err)?);
                    if code_point == 0 {
                        break;
                    }
                    text.push(char::from_u32(code_point).ok_or_else(err)?);
                }
                Ok(FVM::String(text))
            }
        }
    }
}

fn ne<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.try_into().ok()
}

fn fill_value_as_int<T: TryFrom<i64>>(fill_value: &FillValueMetadataV2) -> Option<T> {
    let FillValueMetadataV2::Number(number) = fill_value else {
        return None;
    };
    let int = number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| {
                #[allow(clippy::cast_possible_truncation)]
                let i = f as i64;
                i
            })
    })?;
    T::try_from(int).ok()
}

fn fill_value_as_uint<T: TryFrom<u64>>(fill_value: &FillValueMetadataV2) -> Option<T> {
    let FillValueMetadataV2::Number(number) = fill_value else {
        return None;
    };
    let uint = number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let u = f as u64;
                u
            })
    })?;
    T::try_from(uint).ok()
}

fn fill_value_as_float(fill_value: &FillValueMetadataV2) -> Option<f64> {
    match fill_value {
        FillValueMetadataV2::NaN => Some(f64::NAN),
        FillValueMetadataV2::Infinity => Some(f64::INFINITY),
        FillValueMetadataV2::NegInfinity => Some(f64::NEG_INFINITY),
        FillValueMetadataV2::Number(number) => number.as_f64(),
        _ => None,
    }
}

fn float_to_fill_value(f: f64) -> FillValueMetadataV2 {
    if f.is_nan() {
        FillValueMetadataV2::NaN
    } else if f.is_infinite() && f.is_sign_positive() {
        FillValueMetadataV2::Infinity
    } else if f.is_infinite() {
        FillValueMetadataV2::NegInfinity
    } else {
        serde_json::Number::from_f64(f).map_or(FillValueMetadataV2::NaN, FillValueMetadataV2::Number)
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_value_metadata(json: &str) -> FillValueMetadataV2 {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn data_type_sizes() {
        assert_eq!(DataType::Bool.size(), 1);
        assert_eq!(DataType::Int16.size(), 2);
        assert_eq!(DataType::Float32.size(), 4);
        assert_eq!(DataType::UInt64.size(), 8);
        assert_eq!(DataType::FixedBytes(5).size(), 5);
        assert_eq!(DataType::FixedString(3).size(), 12);
        assert_eq!(DataType::FixedString(3).swap_width(), Some(4));
        assert!(!DataType::FixedBytes(5).has_endianness());
        assert!(!DataType::Int8.has_endianness());
        assert!(DataType::Int64.has_endianness());
    }

    #[test]
    fn data_type_fill_value_numbers() {
        let fill_value = DataType::Int32
            .fill_value_from_metadata(&fill_value_metadata("-7"))
            .unwrap();
        assert_eq!(fill_value.as_ne_bytes(), (-7i32).to_ne_bytes());
        let fill_value = DataType::UInt16
            .fill_value_from_metadata(&fill_value_metadata("300"))
            .unwrap();
        assert_eq!(fill_value.as_ne_bytes(), 300u16.to_ne_bytes());
        assert!(DataType::UInt8
            .fill_value_from_metadata(&fill_value_metadata("300"))
            .is_err());
        assert!(DataType::UInt8
            .fill_value_from_metadata(&fill_value_metadata("-1"))
            .is_err());
        assert!(DataType::Int32
            .fill_value_from_metadata(&fill_value_metadata("3.6"))
            .is_err());
        let fill_value = DataType::Float64
            .fill_value_from_metadata(&fill_value_metadata("3.6"))
            .unwrap();
        assert_eq!(fill_value.as_ne_bytes(), 3.6f64.to_ne_bytes());
    }

    #[test]
    fn data_type_fill_value_non_finite() {
        let fill_value = DataType::Float32
            .fill_value_from_metadata(&fill_value_metadata(r#""NaN""#))
            .unwrap();
        assert!(f32::from_ne_bytes(fill_value.as_ne_bytes().try_into().unwrap()).is_nan());
        assert_eq!(
            DataType::Float32.metadata_fill_value(&fill_value).unwrap(),
            FillValueMetadataV2::NaN
        );
        let fill_value = DataType::Float64
            .fill_value_from_metadata(&fill_value_metadata(r#""-Infinity""#))
            .unwrap();
        assert_eq!(fill_value.as_ne_bytes(), f64::NEG_INFINITY.to_ne_bytes());
        assert_eq!(
            DataType::Float64.metadata_fill_value(&fill_value).unwrap(),
            FillValueMetadataV2::NegInfinity
        );
        assert!(DataType::Int8
            .fill_value_from_metadata(&fill_value_metadata(r#""Infinity""#))
            .is_err());
    }

    #[test]
    fn data_type_fill_value_null_is_zero() {
        for data_type in [
            DataType::Bool,
            DataType::Int64,
            DataType::Float32,
            DataType::FixedBytes(3),
            DataType::FixedString(2),
        ] {
            let fill_value = data_type
                .fill_value_from_metadata(&FillValueMetadataV2::Null)
                .unwrap();
            assert_eq!(fill_value.as_ne_bytes(), vec![0; data_type.size()]);
        }
    }

    #[test]
    fn data_type_fill_value_bool() {
        let fill_value = DataType::Bool
            .fill_value_from_metadata(&fill_value_metadata("true"))
            .unwrap();
        assert_eq!(fill_value.as_ne_bytes(), [1]);
        assert_eq!(
            DataType::Bool.metadata_fill_value(&fill_value).unwrap(),
            FillValueMetadataV2::Bool(true)
        );
        assert!(DataType::Bool
            .metadata_fill_value(&FillValue::from(2u8))
            .is_err());
    }

    #[test]
    fn data_type_fill_value_text() {
        // "YWI=" is base64 for "ab"
        let fill_value = DataType::FixedBytes(4)
            .fill_value_from_metadata(&fill_value_metadata(r#""YWI=""#))
            .unwrap();
        assert_eq!(fill_value.as_ne_bytes(), b"ab\0\0");
        assert!(DataType::FixedBytes(1)
            .fill_value_from_metadata(&fill_value_metadata(r#""YWI=""#))
            .is_err());

        let fill_value = DataType::FixedString(3)
            .fill_value_from_metadata(&fill_value_metadata(r#""hé""#))
            .unwrap();
        assert_eq!(fill_value.size(), 12);
        assert_eq!(
            DataType::FixedString(3)
                .metadata_fill_value(&fill_value)
                .unwrap(),
            FillValueMetadataV2::String("hé".to_string())
        );
    }

    #[test]
    fn data_type_metadata_fill_value_size_mismatch() {
        assert!(DataType::Float64
            .metadata_fill_value(&FillValue::from(0i32))
            .is_err());
    }
}
