use std::sync::Arc;

use crate::{
    array::{
        chunk_shape::compute_size, endianness::reverse_endianness, ChunkShape, DataType,
        Endianness, FillValue,
    },
    storage::{ReadableStorageTraits, StoreKey, WritableStorageTraits},
};

use super::{BytesToBytesCodecTraits, CodecError};

/// Encodes and decodes whole chunks of an array.
///
/// A decoded chunk is the native-endian bytes of every element of the chunk in row-major order.
/// Encoding converts the elements to the declared byte order and then applies the compressor, if any.
/// Decoding reverses this and requires the decompressed bytes to be exactly one chunk.
#[derive(Clone, Debug)]
pub struct ChunkCodec {
    data_type: DataType,
    endianness: Endianness,
    fill_value: FillValue,
    chunk_shape: ChunkShape,
    num_elements: usize,
    compressor: Option<Arc<dyn BytesToBytesCodecTraits>>,
}

impl ChunkCodec {
    /// Create a new chunk codec.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the size of `fill_value` does not match `data_type` or the chunk is too large to address in memory.
    pub fn new(
        data_type: DataType,
        endianness: Endianness,
        fill_value: FillValue,
        chunk_shape: ChunkShape,
        compressor: Option<Arc<dyn BytesToBytesCodecTraits>>,
    ) -> Result<Self, CodecError> {
        if fill_value.size() != data_type.size() {
            return Err(CodecError::Other(format!(
                "fill value {fill_value} is incompatible with data type {data_type}"
            )));
        }
        let num_elements = compute_size(&chunk_shape.to_array_shape())
            .and_then(|num_elements| usize::try_from(num_elements).ok())
            .filter(|num_elements| num_elements.checked_mul(data_type.size()).is_some())
            .ok_or_else(|| {
                CodecError::Other(format!("chunk shape {chunk_shape:?} has too many elements"))
            })?;
        Ok(Self {
            data_type,
            endianness,
            fill_value,
            chunk_shape,
            num_elements,
            compressor,
        })
    }

    /// The data type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// The byte order of encoded chunks.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The fill value.
    #[must_use]
    pub const fn fill_value(&self) -> &FillValue {
        &self.fill_value
    }

    /// The chunk shape.
    #[must_use]
    pub const fn chunk_shape(&self) -> &ChunkShape {
        &self.chunk_shape
    }

    /// The compressor, if any.
    #[must_use]
    pub fn compressor(&self) -> Option<&Arc<dyn BytesToBytesCodecTraits>> {
        self.compressor.as_ref()
    }

    /// The number of elements in a chunk.
    #[must_use]
    pub const fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// The size in bytes of a decoded chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.num_elements * self.data_type.size()
    }

    /// Encode the bytes of a chunk.
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidInputSize`] if `bytes` is not exactly one chunk, or a [`CodecError`] if compression fails.
    pub fn encode(&self, mut bytes: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        if bytes.len() != self.chunk_size() {
            return Err(CodecError::InvalidInputSize(
                bytes.len(),
                self.chunk_size() as u64,
            ));
        }
        if !self.endianness.is_native() {
            reverse_endianness(&mut bytes, &self.data_type);
        }
        match &self.compressor {
            Some(compressor) => compressor.encode(bytes),
            None => Ok(bytes),
        }
    }

    /// Decode an encoded chunk.
    ///
    /// # Errors
    /// Returns [`CodecError::UnexpectedChunkDecodedSize`] if the decoded bytes are not exactly one chunk, or a [`CodecError`] if decompression fails.
    pub fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut bytes = match &self.compressor {
            Some(compressor) => compressor.decode(encoded_value)?,
            None => encoded_value,
        };
        if bytes.len() != self.chunk_size() {
            return Err(CodecError::UnexpectedChunkDecodedSize(
                bytes.len(),
                self.chunk_size() as u64,
            ));
        }
        if !self.endianness.is_native() {
            reverse_endianness(&mut bytes, &self.data_type);
        }
        Ok(bytes)
    }

    /// A decoded chunk with every element equal to the fill value.
    #[must_use]
    pub fn fill_chunk(&self) -> Vec<u8> {
        self.fill_value.repeat(self.num_elements)
    }

    /// Read and decode the chunk at `key`, or [`None`] if the key does not exist.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the store fails or the chunk cannot be decoded.
    pub fn retrieve_if_exists<TStorage: ?Sized + ReadableStorageTraits>(
        &self,
        storage: &TStorage,
        key: &StoreKey,
    ) -> Result<Option<Vec<u8>>, CodecError> {
        storage
            .get(key)?
            .map(|encoded_value| self.decode(encoded_value.into()))
            .transpose()
    }

    /// Read and decode the chunk at `key`.
    ///
    /// A chunk that has never been written is a chunk of the fill value.
    /// Nothing is written to the store in that case.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the store fails or the chunk cannot be decoded.
    pub fn retrieve<TStorage: ?Sized + ReadableStorageTraits>(
        &self,
        storage: &TStorage,
        key: &StoreKey,
    ) -> Result<Vec<u8>, CodecError> {
        if let Some(bytes) = self.retrieve_if_exists(storage, key)? {
            Ok(bytes)
        } else {
            log::debug!("chunk {key} does not exist, using fill value {}", self.fill_value);
            Ok(self.fill_chunk())
        }
    }

    /// Encode `bytes` and write them to `key`, replacing any existing value.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if `bytes` is not exactly one chunk, encoding fails, or the store fails.
    pub fn store<TStorage: ?Sized + WritableStorageTraits>(
        &self,
        storage: &TStorage,
        key: &StoreKey,
        bytes: Vec<u8>,
    ) -> Result<(), CodecError> {
        let encoded_value = self.encode(bytes)?;
        storage.set(key, encoded_value.into())?;
        Ok(())
    }
}
