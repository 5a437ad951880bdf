use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::array::{
    chunk_key_encoding::ChunkKeySeparator, ArrayShape, ChunkShape, DataType, Endianness,
    UnsupportedDataTypeError,
};

use super::MetadataV2;

/// Zarr V2 array metadata, the content of a `.zarray` document.
///
/// An example `JSON` document:
/// ```json
/// {
///     "chunks": [
///         5,
///         6
///     ],
///     "compressor": {
///         "id": "zlib",
///         "level": 1
///     },
///     "dimension_separator": ".",
///     "dtype": ">i4",
///     "fill_value": 0,
///     "filters": null,
///     "order": "C",
///     "shape": [
///         10,
///         15
///     ],
///     "zarr_format": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV2 {
    /// A list of integers defining the length of each dimension of a chunk of the array.
    pub chunks: ChunkShape,
    /// A JSON object identifying the primary compression codec and providing configuration parameters, or null if no compressor is to be used.
    pub compressor: Option<MetadataV2>,
    /// Either "." or "/", the separator placed between the dimensions of a chunk key.
    #[serde(default = "chunk_key_separator_default_zarr_v2")]
    pub dimension_separator: ChunkKeySeparator,
    /// The data type and byte order, e.g. `<f8` or `>i4`.
    pub dtype: String,
    /// A scalar value providing the default value to use for uninitialized portions of the array.
    pub fill_value: FillValueMetadataV2,
    /// A list of JSON objects providing filter configurations, or null if no filters are to be applied.
    #[serde(default)]
    pub filters: Option<Vec<MetadataV2>>,
    /// Either "C" or "F", defining the layout of bytes within each chunk of the array.
    pub order: ArrayMetadataV2Order,
    /// An array of integers providing the length of each dimension of the array.
    pub shape: ArrayShape,
    /// An integer defining the version of the storage specification to which the array adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// Optional user attributes, stored separately in `.zattrs`.
    #[serde(skip)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

const fn chunk_key_separator_default_zarr_v2() -> ChunkKeySeparator {
    ChunkKeySeparator::Dot
}

impl ArrayMetadataV2 {
    /// Create row-major array metadata with no filters, no attributes and a `.` dimension separator.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        chunks: ChunkShape,
        dtype: String,
        fill_value: FillValueMetadataV2,
        compressor: Option<MetadataV2>,
    ) -> Self {
        Self {
            chunks,
            compressor,
            dimension_separator: ChunkKeySeparator::Dot,
            dtype,
            fill_value,
            filters: None,
            order: ArrayMetadataV2Order::C,
            shape,
            zarr_format: monostate::MustBe!(2u64),
            attributes: serde_json::Map::default(),
        }
    }

    /// Set the dimension separator.
    #[must_use]
    pub fn with_dimension_separator(mut self, dimension_separator: ChunkKeySeparator) -> Self {
        self.dimension_separator = dimension_separator;
        self
    }

    /// Set the user attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Convert a Zarr V2 `dtype` to a [`DataType`].
///
/// Multi-byte numbers and `U` need a `<` or `>` prefix.
/// Any prefix is accepted for single-byte numbers, `b1` and `S`, e.g. `>i1` as written by some Zarr V2 implementations.
///
/// # Errors
/// Returns an [`UnsupportedDataTypeError`] if the data type is not supported.
pub fn data_type_metadata_v2_to_data_type(
    dtype: &str,
) -> Result<DataType, UnsupportedDataTypeError> {
    let err = || UnsupportedDataTypeError::from(dtype.to_string());
    let mut chars = dtype.chars();
    let order = chars.next().ok_or_else(err)?;
    if !matches!(order, '|' | '<' | '>') {
        return Err(err());
    }
    let code = chars.as_str();
    let data_type = match code {
        "b1" => DataType::Bool,
        "i1" => DataType::Int8,
        "i2" => DataType::Int16,
        "i4" => DataType::Int32,
        "i8" => DataType::Int64,
        "u1" => DataType::UInt8,
        "u2" => DataType::UInt16,
        "u4" => DataType::UInt32,
        "u8" => DataType::UInt64,
        "f4" => DataType::Float32,
        "f8" => DataType::Float64,
        _ => {
            let length = |digits: &str| {
                digits
                    .parse::<usize>()
                    .ok()
                    .filter(|length| *length > 0)
                    .ok_or_else(err)
            };
            if let Some(digits) = code.strip_prefix('S') {
                DataType::FixedBytes(length(digits)?)
            } else if let Some(digits) = code.strip_prefix('U') {
                DataType::FixedString(length(digits)?)
            } else {
                return Err(err());
            }
        }
    };
    if order == '|' && data_type.has_endianness() {
        return Err(err());
    }
    Ok(data_type)
}

/// A Zarr V2 invalid data type endianness error.
#[derive(Debug, Error)]
#[error("invalid V2 data type {_0:?}, it must begin with |, < or >")]
pub struct DataTypeMetadataV2InvalidEndiannessError(String);

/// Get the byte order of a Zarr V2 `dtype`.
///
/// Returns [`None`] for the `|` (not applicable) prefix.
///
/// # Errors
/// Returns a [`DataTypeMetadataV2InvalidEndiannessError`] if the byte order prefix is invalid.
pub fn data_type_metadata_v2_to_endianness(
    dtype: &str,
) -> Result<Option<Endianness>, DataTypeMetadataV2InvalidEndiannessError> {
    if dtype.starts_with('|') {
        Ok(None)
    } else if dtype.starts_with('<') {
        Ok(Some(Endianness::Little))
    } else if dtype.starts_with('>') {
        Ok(Some(Endianness::Big))
    } else {
        Err(DataTypeMetadataV2InvalidEndiannessError(dtype.to_string()))
    }
}

/// Convert a [`DataType`] and byte order to a Zarr V2 `dtype`.
///
/// Data types without a byte order always use the `|` prefix.
#[must_use]
pub fn data_type_to_metadata_v2(data_type: &DataType, endianness: Endianness) -> String {
    let order = if !data_type.has_endianness() {
        '|'
    } else if endianness == Endianness::Little {
        '<'
    } else {
        '>'
    };
    let code = match data_type {
        DataType::Bool => "b1".to_string(),
        DataType::Int8 => "i1".to_string(),
        DataType::Int16 => "i2".to_string(),
        DataType::Int32 => "i4".to_string(),
        DataType::Int64 => "i8".to_string(),
        DataType::UInt8 => "u1".to_string(),
        DataType::UInt16 => "u2".to_string(),
        DataType::UInt32 => "u4".to_string(),
        DataType::UInt64 => "u8".to_string(),
        DataType::Float32 => "f4".to_string(),
        DataType::Float64 => "f8".to_string(),
        DataType::FixedBytes(n) => format!("S{n}"),
        DataType::FixedString(n) => format!("U{n}"),
    };
    format!("{order}{code}")
}

/// A scalar value providing the default value to use for uninitialized portions of the array.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FillValueMetadataV2 {
    /// No fill value, interpreted as all zero bytes.
    Null,
    /// NaN (not-a-number).
    NaN,
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegInfinity,
    /// A number.
    Number(serde_json::Number),
    /// A boolean.
    Bool(bool),
    /// A string, base64 encoded bytes for `|S` data types or text for `U` data types.
    String(String),
}

impl<'de> serde::Deserialize<'de> for FillValueMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FillValueMetadataV2Type {
            String(String),
            Number(serde_json::Number),
            Bool(bool),
            Null,
        }
        let fill_value = FillValueMetadataV2Type::deserialize(d)?;
        match fill_value {
            FillValueMetadataV2Type::String(string) => match string.as_str() {
                "NaN" => Ok(Self::NaN),
                "Infinity" => Ok(Self::Infinity),
                "-Infinity" => Ok(Self::NegInfinity),
                _ => Ok(Self::String(string)),
            },
            FillValueMetadataV2Type::Number(number) => Ok(Self::Number(number)),
            FillValueMetadataV2Type::Bool(bool) => Ok(Self::Bool(bool)),
            FillValueMetadataV2Type::Null => Ok(Self::Null),
        }
    }
}

impl Serialize for FillValueMetadataV2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::NaN => serializer.serialize_str("NaN"),
            Self::Infinity => serializer.serialize_str("Infinity"),
            Self::NegInfinity => serializer.serialize_str("-Infinity"),
            Self::Number(number) => number.serialize(serializer),
            Self::Bool(bool) => serializer.serialize_bool(*bool),
            Self::String(string) => serializer.serialize_str(string),
        }
    }
}

impl core::fmt::Display for FillValueMetadataV2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", serde_json::to_string(self).unwrap_or_default())
    }
}

/// The layout of bytes within each chunk of the array.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub enum ArrayMetadataV2Order {
    /// Row-major order. The last dimension varies fastest.
    C,
    /// Column-major order. The first dimension varies fastest.
    F,
}
