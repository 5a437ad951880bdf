use std::sync::Arc;

use crate::metadata::v2::{array::data_type_to_metadata_v2, ArrayMetadataV2};

use super::{
    chunk_key_encoding::ChunkKeySeparator,
    codec::BytesToBytesCodecTraits,
    endianness::NATIVE_ENDIAN,
    Array, ArrayCreateError, ArrayShape, ChunkShape, DataType, Endianness, FillValue,
};

/// An [`Array`] builder.
///
/// The array builder is initialised from an array shape, data type, chunk shape, and fill value.
///  - The default byte order is the native byte order of the CPU.
///  - There is no compressor by default, so the output is uncompressed.
///  - The default dimension separator is `.`.
///  - Attributes are empty.
///
/// Use the methods in the array builder to change the configuration away from these defaults, and then build the array at a path of some storage with [`ArrayBuilder::build`].
/// Note that [`build`](ArrayBuilder::build) does not modify the store; the array metadata has to be explicitly written with [`Array::store_metadata`].
///
/// For example:
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # use std::sync::Arc;
/// use zarrs_v2::array::{codec::BytesToBytesCodecTraits, ArrayBuilder, DataType, Endianness, FillValue};
/// # let store = Arc::new(zarrs_v2::storage::store::MemoryStore::new());
/// let compressor: Arc<dyn BytesToBytesCodecTraits> =
///     Arc::new(zarrs_v2::array::codec::ZlibCodec::new(5)?);
/// let array = ArrayBuilder::new(
///     vec![8, 8], // array shape
///     DataType::Float32,
///     vec![4, 4].try_into()?, // regular chunk shape (elements must be non-zero)
///     FillValue::from(f32::NAN),
/// )
/// .endianness(Endianness::Big)
/// .compressor(Some(compressor))
/// .build(store.clone(), "/group/array")?;
/// array.store_metadata()?; // write metadata to the store
///
/// // array.store_chunk(...)
/// // array.store_array_subset(...)
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArrayBuilder {
    /// Array shape.
    pub shape: ArrayShape,
    /// Data type.
    pub data_type: DataType,
    /// Chunk shape.
    pub chunk_shape: ChunkShape,
    /// Fill value.
    pub fill_value: FillValue,
    /// Byte order of stored chunks.
    pub endianness: Endianness,
    /// Compressor.
    pub compressor: Option<Arc<dyn BytesToBytesCodecTraits>>,
    /// Dimension separator.
    pub dimension_separator: ChunkKeySeparator,
    /// Attributes.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ArrayBuilder {
    /// Create a new array builder for an array at `path`.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        data_type: DataType,
        chunk_shape: ChunkShape,
        fill_value: FillValue,
    ) -> Self {
        Self {
            shape,
            data_type,
            chunk_shape,
            fill_value,
            endianness: NATIVE_ENDIAN,
            compressor: None,
            dimension_separator: ChunkKeySeparator::Dot,
            attributes: serde_json::Map::default(),
        }
    }

    /// Create a new builder copying the configuration of an existing array.
    #[must_use]
    pub fn from_array<T: ?Sized>(array: &Array<T>) -> Self {
        Self {
            shape: array.shape().to_vec(),
            data_type: *array.data_type(),
            chunk_shape: array.chunk_grid().chunk_shape().clone(),
            fill_value: array.fill_value().clone(),
            endianness: array.endianness(),
            compressor: array.chunk_codec().compressor().cloned(),
            dimension_separator: array.chunk_key_encoding().separator(),
            attributes: array.attributes().clone(),
        }
    }

    /// Set the shape.
    pub fn shape(&mut self, shape: ArrayShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the data type.
    pub fn data_type(&mut self, data_type: DataType) -> &mut Self {
        self.data_type = data_type;
        self
    }

    /// Set the chunk shape.
    pub fn chunk_shape(&mut self, chunk_shape: ChunkShape) -> &mut Self {
        self.chunk_shape = chunk_shape;
        self
    }

    /// Set the fill value.
    pub fn fill_value(&mut self, fill_value: FillValue) -> &mut Self {
        self.fill_value = fill_value;
        self
    }

    /// Set the byte order of stored chunks.
    ///
    /// It is ignored by data types without a byte order.
    pub fn endianness(&mut self, endianness: Endianness) -> &mut Self {
        self.endianness = endianness;
        self
    }

    /// Set the compressor.
    ///
    /// If left unmodified, chunks are stored uncompressed.
    pub fn compressor(
        &mut self,
        compressor: Option<Arc<dyn BytesToBytesCodecTraits>>,
    ) -> &mut Self {
        self.compressor = compressor;
        self
    }

    /// Set the dimension separator.
    ///
    /// If left unmodified, the array will use `.` as the dimension separator.
    pub fn dimension_separator(&mut self, dimension_separator: ChunkKeySeparator) -> &mut Self {
        self.dimension_separator = dimension_separator;
        self
    }

    /// Set the user defined attributes.
    ///
    /// If left unmodified, the user defined attributes of the array will be empty.
    pub fn attributes(
        &mut self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Build the array metadata.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError::IncompatibleFillValue`] if the fill value is incompatible with the data type.
    pub fn build_metadata(&self) -> Result<ArrayMetadataV2, ArrayCreateError> {
        let fill_value = self.data_type.metadata_fill_value(&self.fill_value)?;
        Ok(ArrayMetadataV2::new(
            self.shape.clone(),
            self.chunk_shape.clone(),
            data_type_to_metadata_v2(&self.data_type, self.endianness),
            fill_value,
            self.compressor
                .as_ref()
                .map(|compressor| compressor.create_metadata()),
        )
        .with_dimension_separator(self.dimension_separator)
        .with_attributes(self.attributes.clone()))
    }

    /// Build into an [`Array`].
    ///
    /// # Errors
    ///
    /// Returns [`ArrayCreateError`] if there is an error creating the array.
    /// This can be due to a storage error, an invalid path, or a problem with array configuration.
    pub fn build<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        Array::new_with_metadata(storage, path, self.build_metadata()?)
    }
}
