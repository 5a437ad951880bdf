use thiserror::Error;

use crate::{
    array_subset::{
        ArrayExtractBytesError, ArrayStoreBytesError, ArraySubset, ArraySubsetError,
        IncompatibleDimensionalityError,
    },
    metadata::v2::array::DataTypeMetadataV2InvalidEndiannessError,
    node::NodePathError,
    plugin::PluginCreateError,
    storage::StorageError,
};

use super::{
    chunk_grid::{ChunkIndicesError, InvalidChunkGridIndicesError},
    codec::CodecError,
    data_type::{
        IncompatibleFillValueError, IncompatibleFillValueMetadataError, UnsupportedDataTypeError,
    },
    ArrayShape,
};

/// An array creation error.
#[derive(Debug, Error)]
pub enum ArrayCreateError {
    /// An invalid node path
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// Unsupported data type.
    #[error(transparent)]
    DataTypeCreateError(#[from] UnsupportedDataTypeError),
    /// Invalid data type endianness.
    #[error(transparent)]
    InvalidEndianness(#[from] DataTypeMetadataV2InvalidEndiannessError),
    /// Invalid fill value.
    #[error(transparent)]
    InvalidFillValue(#[from] IncompatibleFillValueMetadataError),
    /// The fill value does not match the data type.
    #[error(transparent)]
    IncompatibleFillValue(#[from] IncompatibleFillValueError),
    /// Error creating the compressor.
    #[error(transparent)]
    CompressorCreateError(#[from] PluginCreateError),
    /// The dimensionality of the chunk shape does not match the array shape.
    #[error("chunk shape dimensionality {0} does not match array dimensionality {1}")]
    InvalidChunkGridDimensionality(usize, usize),
    /// The number of elements in a chunk exceeds the addressable memory.
    #[error("chunk shape {_0:?} has too many elements")]
    ChunkTooLarge(ArrayShape),
    /// Filters are not supported.
    #[error("filters are not supported")]
    UnsupportedFilters,
    /// Only C (row-major) order is supported.
    #[error("unsupported memory order {0}, expected C")]
    UnsupportedOrder(char),
    /// Storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An error deserializing the metadata.
    #[error(transparent)]
    MetadataDeserializationError(#[from] serde_json::Error),
    /// Missing metadata.
    #[error("array metadata is missing")]
    MissingMetadata,
}

/// Array errors.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A codec error.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// Invalid chunk grid indices.
    #[error(transparent)]
    InvalidChunkGridIndicesError(#[from] InvalidChunkGridIndicesError),
    /// Malformed chunk indexer input.
    #[error(transparent)]
    ChunkIndicesError(#[from] ChunkIndicesError),
    /// Incompatible dimensionality.
    #[error(transparent)]
    IncompatibleDimensionalityError(#[from] IncompatibleDimensionalityError),
    /// An array subset could not be positioned relative to a chunk.
    #[error(transparent)]
    ArraySubsetError(#[from] ArraySubsetError),
    /// Incompatible array subset.
    #[error("array subset {_0} is not compatible with array shape {_1:?}")]
    InvalidArraySubset(ArraySubset, ArrayShape),
    /// An unexpected bytes input size.
    #[error("got bytes with size {_0:?}, expected {_1:?}")]
    InvalidBytesInputSize(usize, u64),
    /// Extracting the bytes of an array subset failed.
    #[error(transparent)]
    ArrayExtractBytesError(#[from] ArrayExtractBytesError),
    /// Storing the bytes of an array subset failed.
    #[error(transparent)]
    ArrayStoreBytesError(#[from] ArrayStoreBytesError),
    /// The element type does not match the data type of the array.
    #[error("the element type does not match the data type")]
    IncompatibleElementType,
    /// An element has an invalid value for the data type, e.g. a `bool` byte that is not 0 or 1.
    #[error("invalid element value")]
    InvalidElementValue,
}
