use crate::{
    array_subset::ArraySubset,
    config::global_config,
    storage::{create_array, data_key, erase_chunk, StorageError, WritableStorageTraits},
};

use super::{Array, ArrayError, Element};

impl<TStorage: ?Sized + WritableStorageTraits> Array<TStorage> {
    /// Store metadata.
    ///
    /// Writes `.zarray`, and `.zattrs` if the array has attributes.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), StorageError> {
        create_array(&*self.storage, self.path(), &self.metadata())
    }

    /// Reset the elements of a boundary chunk that lie outside the array shape to the fill value.
    fn fill_chunk_outside_array(
        &self,
        chunk_indices: &[u64],
        chunk_bytes: Vec<u8>,
    ) -> Result<Vec<u8>, ArrayError> {
        let chunk_subset = self.chunk_grid.subset(chunk_indices)?;
        let chunk_shape = chunk_subset.shape();
        let element_size = self.data_type().size();
        let inbounds = chunk_subset
            .overlap(&ArraySubset::new_with_shape(self.shape().to_vec()))?
            .relative_to(chunk_subset.start())?;
        let inbounds_bytes = inbounds.extract_bytes(&chunk_bytes, chunk_shape, element_size)?;
        let mut filled = self.chunk_codec.fill_chunk();
        inbounds.store_bytes(&inbounds_bytes, &mut filled, chunk_shape, element_size)?;
        Ok(filled)
    }

    /// Encode `chunk_bytes` and store at `chunk_indices`.
    ///
    /// A chunk holding only the fill value is stored like any other chunk.
    /// If the [boundary chunk fill](crate::config::Config#boundary-chunk-fill) option is enabled, elements of a boundary chunk outside the array shape are stored as the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - the length of `chunk_bytes` is not equal to the expected length (the product of the number of elements in the chunk and the data type size),
    ///  - there is a codec encoding error, or
    ///  - an underlying store error.
    pub fn store_chunk(&self, chunk_indices: &[u64], chunk_bytes: Vec<u8>) -> Result<(), ArrayError> {
        self.chunk_grid.subset(chunk_indices)?;
        let chunk_size = self.chunk_codec.chunk_size();
        if chunk_bytes.len() != chunk_size {
            return Err(ArrayError::InvalidBytesInputSize(
                chunk_bytes.len(),
                chunk_size as u64,
            ));
        }

        let chunk_bytes = if global_config().boundary_chunk_fill()
            && self.chunk_grid.is_boundary_chunk(chunk_indices)
        {
            self.fill_chunk_outside_array(chunk_indices, chunk_bytes)?
        } else {
            chunk_bytes
        };

        let key = data_key(self.path(), chunk_indices, &self.chunk_key_encoding);
        log::trace!("storing chunk {chunk_indices:?} of {} at {key}", self.path());
        Ok(self
            .chunk_codec
            .store(&*self.storage, &key, chunk_bytes)?)
    }

    /// Encode `chunk_elements` and store at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the element type does not match the data type, or
    ///  - a [`store_chunk`](Array::store_chunk) error condition is met.
    pub fn store_chunk_elements<T: Element>(
        &self,
        chunk_indices: &[u64],
        chunk_elements: &[T],
    ) -> Result<(), ArrayError> {
        let chunk_bytes = T::into_bytes(self.data_type(), chunk_elements)?;
        self.store_chunk(chunk_indices, chunk_bytes)
    }

    /// Erase the chunk at `chunk_indices`.
    ///
    /// Succeeds if the chunk does not exist.
    /// An erased chunk reads as the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_indices` are invalid or there is an underlying store error.
    pub fn erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        self.chunk_grid.subset(chunk_indices)?;
        Ok(erase_chunk(
            &*self.storage,
            self.path(),
            chunk_indices,
            &self.chunk_key_encoding,
        )?)
    }
}
