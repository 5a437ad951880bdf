//! Zarr V2 arrays.
//!
//! An array is a node in a Zarr hierarchy used to hold multidimensional array data and associated metadata.
//! See <https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html#arrays>.
//!
//! Use [`ArrayBuilder`] to setup a new array, or use [`Array::new`] for an existing array.
//! The documentation for [`Array`] details how to interact with arrays.

mod array_builder;
mod array_errors;
mod array_sync_readable;
mod array_sync_readable_writable;
mod array_sync_writable;
pub mod chunk_grid;
pub mod chunk_key_encoding;
mod chunk_shape;
pub mod codec;
pub mod data_type;
mod element;
pub mod endianness;
mod fill_value;

use std::sync::Arc;

pub use self::{
    array_builder::ArrayBuilder,
    array_errors::{ArrayCreateError, ArrayError},
    chunk_grid::RegularChunkGrid,
    chunk_key_encoding::{ChunkKeyEncoding, ChunkKeySeparator},
    chunk_shape::{compute_size, compute_size_u32, ChunkShape, NonZeroError},
    codec::ChunkCodec,
    data_type::{DataType, UnsupportedDataTypeError},
    element::Element,
    endianness::Endianness,
    fill_value::FillValue,
};

use crate::{
    array_subset::ArraySubset,
    metadata::v2::{
        array::{data_type_metadata_v2_to_data_type, data_type_metadata_v2_to_endianness},
        ArrayMetadataV2, ArrayMetadataV2Order, FillValueMetadataV2,
    },
    node::NodePath,
    storage::{meta_key_v2_array, meta_key_v2_attributes, ReadableStorageTraits},
};

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// A Zarr V2 array.
///
/// ### Metadata
///
/// An array is defined by the following parameters, encoded in its `.zarray` JSON metadata:
///  - **shape**: the length of each array dimension,
///  - **chunks**: the shape of every chunk of the regular chunk grid,
///  - **dtype**: the data type and byte order of each element,
///  - **fill_value**: an element value to use for uninitialised portions of the array,
///  - **compressor**: an optional compressor applied to the bytes of each chunk,
///  - **dimension_separator**: the separator between chunk grid indices in chunk keys.
///
/// Optional user attributes are stored beside the metadata in `.zattrs`.
/// Only row-major (`"C"`) order without filters is supported.
///
/// ### Initilisation
///
/// An existing array is opened with [`Array::new`], which reads its metadata from the store.
/// A new array is setup with [`ArrayBuilder`] or [`Array::new_with_metadata`], and its metadata written with [`Array::store_metadata`].
///
/// ### Array Methods
///
/// The methods available depend on the capabilities of the storage:
///  - [`ReadableStorageTraits`]: retrieve chunks and array subsets,
///  - [`WritableStorageTraits`](crate::storage::WritableStorageTraits): store and erase chunks, store metadata,
///  - [`ReadableWritableStorageTraits`](crate::storage::ReadableWritableStorageTraits): store array subsets (read-modify-write).
///
/// Byte methods operate on the native-endian bytes of elements in row-major order.
/// `_elements` methods operate on a vector of an [`Element`] type matching the data type.
///
/// A chunk that has never been written reads as the fill value.
/// Distinct chunks live at distinct keys, so the `par_` methods process chunks concurrently with [`rayon`].
#[derive(Debug)]
pub struct Array<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The path of the array in a store.
    path: NodePath,
    /// The chunk grid, which also holds the array shape.
    chunk_grid: RegularChunkGrid,
    /// The mapping from chunk grid cell coordinates to keys in the underlying store.
    chunk_key_encoding: ChunkKeyEncoding,
    /// Encodes and decodes chunks.
    chunk_codec: ChunkCodec,
    /// The data type as it appears in the metadata, which may have a byte order prefix the data type does not need.
    dtype_metadata: String,
    /// The fill value as it appears in the metadata.
    fill_value_metadata: FillValueMetadataV2,
    /// Optional user defined attributes.
    attributes: serde_json::Map<String, serde_json::Value>,
}

impl<TStorage: ?Sized> Array<TStorage> {
    /// Create an array in `storage` at `path` with `metadata`.
    /// This does **not** write to the store, use [`store_metadata`](Array<WritableStorageTraits>::store_metadata) to write `metadata` to `storage`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if:
    ///  - any metadata is invalid or,
    ///  - the array uses column-major order or filters.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: ArrayMetadataV2,
    ) -> Result<Self, ArrayCreateError> {
        let path = NodePath::new(path)?;
        if metadata.order == ArrayMetadataV2Order::F {
            return Err(ArrayCreateError::UnsupportedOrder('F'));
        }
        if metadata
            .filters
            .as_ref()
            .is_some_and(|filters| !filters.is_empty())
        {
            return Err(ArrayCreateError::UnsupportedFilters);
        }

        let endianness = data_type_metadata_v2_to_endianness(&metadata.dtype)?
            .unwrap_or(endianness::NATIVE_ENDIAN);
        let data_type = data_type_metadata_v2_to_data_type(&metadata.dtype)?;
        let fill_value = data_type.fill_value_from_metadata(&metadata.fill_value)?;
        let compressor = metadata
            .compressor
            .as_ref()
            .map(codec::compressor_from_metadata)
            .transpose()?;

        let chunk_grid = RegularChunkGrid::new(metadata.shape.clone(), metadata.chunks.clone())
            .map_err(|_| {
                ArrayCreateError::InvalidChunkGridDimensionality(
                    metadata.chunks.len(),
                    metadata.shape.len(),
                )
            })?;
        let chunk_codec = ChunkCodec::new(
            data_type,
            endianness,
            fill_value,
            metadata.chunks.clone(),
            compressor,
        )
        .map_err(|_| ArrayCreateError::ChunkTooLarge(metadata.chunks.to_array_shape()))?;

        Ok(Self {
            storage,
            path,
            chunk_grid,
            chunk_key_encoding: ChunkKeyEncoding::new(metadata.dimension_separator),
            chunk_codec,
            dtype_metadata: metadata.dtype,
            fill_value_metadata: metadata.fill_value,
            attributes: metadata.attributes,
        })
    }

    /// Get the underlying storage backing the array.
    #[must_use]
    pub fn storage(&self) -> Arc<TStorage> {
        self.storage.clone()
    }

    /// Get the node path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get the array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        self.chunk_grid.array_shape()
    }

    /// Get the dimensionality of the array.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape().len()
    }

    /// Get the data type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        self.chunk_codec.data_type()
    }

    /// Get the byte order of stored chunks.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.chunk_codec.endianness()
    }

    /// Get the fill value.
    #[must_use]
    pub const fn fill_value(&self) -> &FillValue {
        self.chunk_codec.fill_value()
    }

    /// Get the chunk grid.
    #[must_use]
    pub const fn chunk_grid(&self) -> &RegularChunkGrid {
        &self.chunk_grid
    }

    /// Get the chunk key encoding.
    #[must_use]
    pub const fn chunk_key_encoding(&self) -> &ChunkKeyEncoding {
        &self.chunk_key_encoding
    }

    /// Get the chunk codec.
    #[must_use]
    pub const fn chunk_codec(&self) -> &ChunkCodec {
        &self.chunk_codec
    }

    /// Get the attributes.
    #[must_use]
    pub const fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.attributes
    }

    /// Mutably borrow the array attributes.
    #[must_use]
    pub fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.attributes
    }

    /// Create [`ArrayMetadataV2`].
    #[must_use]
    pub fn metadata(&self) -> ArrayMetadataV2 {
        ArrayMetadataV2::new(
            self.shape().to_vec(),
            self.chunk_grid.chunk_shape().clone(),
            self.dtype_metadata.clone(),
            self.fill_value_metadata.clone(),
            self.chunk_codec
                .compressor()
                .map(|compressor| compressor.create_metadata()),
        )
        .with_dimension_separator(self.chunk_key_encoding.separator())
        .with_attributes(self.attributes.clone())
    }

    /// Return the shape of the chunk grid (i.e., the number of chunks along each dimension).
    #[must_use]
    pub fn chunk_grid_shape(&self) -> ArrayShape {
        self.chunk_grid.grid_shape()
    }

    /// Return the array subset of the chunk at `chunk_indices`.
    ///
    /// The subset of a boundary chunk extends past the array shape, see [`Array::chunk_subset_bounded`].
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidChunkGridIndicesError`] if the `chunk_indices` are incompatible with the chunk grid.
    pub fn chunk_subset(&self, chunk_indices: &[u64]) -> Result<ArraySubset, ArrayError> {
        Ok(self.chunk_grid.subset(chunk_indices)?)
    }

    /// Return the array subset of the chunk at `chunk_indices` bounded by the array shape.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidChunkGridIndicesError`] if the `chunk_indices` are incompatible with the chunk grid.
    pub fn chunk_subset_bounded(&self, chunk_indices: &[u64]) -> Result<ArraySubset, ArrayError> {
        let chunk_subset = self.chunk_subset(chunk_indices)?;
        Ok(chunk_subset.overlap(&ArraySubset::new_with_shape(self.shape().to_vec()))?)
    }

    /// Return the indices of the chunks overlapping `array_subset`, in row-major order.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidArraySubset`] if `array_subset` does not match the dimensionality of the array or is not within its bounds.
    pub fn chunks_in_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<ArrayIndices>, ArrayError> {
        self.validate_array_subset(array_subset)?;
        Ok(self.chunk_grid.chunks_in_array_subset(array_subset)?)
    }

    fn validate_array_subset(&self, array_subset: &ArraySubset) -> Result<(), ArrayError> {
        if array_subset.inbounds(self.shape()) {
            Ok(())
        } else {
            Err(ArrayError::InvalidArraySubset(
                array_subset.clone(),
                self.shape().to_vec(),
            ))
        }
    }

    /// The size in bytes of the elements of `array_subset`.
    fn array_subset_size(&self, array_subset: &ArraySubset) -> Result<usize, ArrayError> {
        array_subset
            .num_elements()
            .and_then(|num_elements| num_elements.checked_mul(self.data_type().size() as u64))
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| {
                ArrayError::InvalidArraySubset(array_subset.clone(), self.shape().to_vec())
            })
    }

    /// Returns true if the `par_` methods should process `num_chunks` concurrently.
    fn parallel_chunks(num_chunks: usize) -> bool {
        num_chunks > 1 && num_chunks >= crate::config::global_config().chunk_concurrent_minimum()
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Array<TStorage> {
    /// Create an array in `storage` at `path`. The metadata is read from the store.
    ///
    /// User attributes are read from `.zattrs`, if it exists.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if there is a storage error, the metadata is missing, or any metadata is invalid.
    pub fn new(storage: Arc<TStorage>, path: &str) -> Result<Self, ArrayCreateError> {
        let node_path = NodePath::new(path)?;
        let key = meta_key_v2_array(&node_path);
        let mut metadata: ArrayMetadataV2 = match storage.get(&key)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => return Err(ArrayCreateError::MissingMetadata),
        };
        if let Some(bytes) = storage.get(&meta_key_v2_attributes(&node_path))? {
            metadata.attributes = serde_json::from_slice(&bytes)?;
        }
        log::debug!("opened array {node_path} with metadata {metadata}");
        Self::new_with_metadata(storage, path, metadata)
    }
}
