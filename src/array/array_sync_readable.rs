use rayon::prelude::*;

use crate::{
    array_subset::ArraySubset,
    storage::{data_key, ReadableStorageTraits},
};

use super::{Array, ArrayError, Element};

impl<TStorage: ?Sized + ReadableStorageTraits> Array<TStorage> {
    /// Read and decode the chunk at `chunk_indices` into its bytes if it exists.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk_if_exists(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<u8>>, ArrayError> {
        self.chunk_grid.subset(chunk_indices)?;
        let key = data_key(self.path(), chunk_indices, &self.chunk_key_encoding);
        Ok(self.chunk_codec.retrieve_if_exists(&*self.storage, &key)?)
    }

    /// Read and decode the chunk at `chunk_indices` into its bytes or the fill value if it does not exist.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk(&self, chunk_indices: &[u64]) -> Result<Vec<u8>, ArrayError> {
        self.chunk_grid.subset(chunk_indices)?;
        let key = data_key(self.path(), chunk_indices, &self.chunk_key_encoding);
        Ok(self.chunk_codec.retrieve(&*self.storage, &key)?)
    }

    /// Read and decode the chunk at `chunk_indices` into a vector of its elements if it exists.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the element type does not match the data type,
    ///  - a [`retrieve_chunk_if_exists`](Array::retrieve_chunk_if_exists) error condition is met.
    pub fn retrieve_chunk_elements_if_exists<T: Element>(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<T>>, ArrayError> {
        T::validate_data_type(self.data_type())?;
        self.retrieve_chunk_if_exists(chunk_indices)?
            .map(|bytes| T::from_bytes(self.data_type(), bytes))
            .transpose()
    }

    /// Read and decode the chunk at `chunk_indices` into a vector of its elements or the fill value if it does not exist.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the element type does not match the data type,
    ///  - a [`retrieve_chunk`](Array::retrieve_chunk) error condition is met.
    pub fn retrieve_chunk_elements<T: Element>(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Vec<T>, ArrayError> {
        T::validate_data_type(self.data_type())?;
        T::from_bytes(self.data_type(), self.retrieve_chunk(chunk_indices)?)
    }

    /// Read the chunk at `chunk_indices` and return the part of it overlapping `array_subset`.
    ///
    /// Returns the overlap relative to `array_subset` and its bytes.
    fn retrieve_chunk_overlap(
        &self,
        chunk_indices: &[u64],
        array_subset: &ArraySubset,
    ) -> Result<(ArraySubset, Vec<u8>), ArrayError> {
        let chunk_subset = self.chunk_grid.subset(chunk_indices)?;
        let overlap = array_subset.overlap(&chunk_subset)?;
        let chunk_bytes = self.retrieve_chunk(chunk_indices)?;
        let overlap_bytes = overlap.relative_to(chunk_subset.start())?.extract_bytes(
            &chunk_bytes,
            chunk_subset.shape(),
            self.data_type().size(),
        )?;
        Ok((overlap.relative_to(array_subset.start())?, overlap_bytes))
    }

    fn _retrieve_array_subset(
        &self,
        array_subset: &ArraySubset,
        parallel: bool,
    ) -> Result<Vec<u8>, ArrayError> {
        let mut output = vec![0; self.array_subset_size(array_subset)?];
        let chunks = self.chunks_in_array_subset(array_subset)?;
        let element_size = self.data_type().size();
        let mut store_overlap = |(overlap, overlap_bytes): (ArraySubset, Vec<u8>)| {
            overlap.store_bytes(
                &overlap_bytes,
                &mut output,
                array_subset.shape(),
                element_size,
            )
        };

        if parallel && Self::parallel_chunks(chunks.len()) {
            let overlaps = chunks
                .par_iter()
                .map(|chunk_indices| self.retrieve_chunk_overlap(chunk_indices, array_subset))
                .collect::<Result<Vec<_>, ArrayError>>()?;
            for overlap in overlaps {
                store_overlap(overlap)?;
            }
        } else {
            for chunk_indices in &chunks {
                store_overlap(self.retrieve_chunk_overlap(chunk_indices, array_subset)?)?;
            }
        }
        Ok(output)
    }

    /// Read and decode the `array_subset` of array into its bytes.
    ///
    /// Elements in chunks that have never been written have the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if:
    ///  - the `array_subset` dimensionality does not match the array dimensionality,
    ///  - the `array_subset` is not within the array shape,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_array_subset(&self, array_subset: &ArraySubset) -> Result<Vec<u8>, ArrayError> {
        self._retrieve_array_subset(array_subset, false)
    }

    /// Parallel version of [`Array::retrieve_array_subset`].
    #[allow(clippy::missing_errors_doc)]
    pub fn par_retrieve_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<u8>, ArrayError> {
        self._retrieve_array_subset(array_subset, true)
    }

    /// Read and decode the `array_subset` of array into a vector of its elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if:
    ///  - the element type does not match the data type, or
    ///  - a [`retrieve_array_subset`](Array::retrieve_array_subset) error condition is met.
    pub fn retrieve_array_subset_elements<T: Element>(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<T>, ArrayError> {
        T::validate_data_type(self.data_type())?;
        T::from_bytes(self.data_type(), self.retrieve_array_subset(array_subset)?)
    }

    /// Parallel version of [`Array::retrieve_array_subset_elements`].
    #[allow(clippy::missing_errors_doc)]
    pub fn par_retrieve_array_subset_elements<T: Element>(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<T>, ArrayError> {
        T::validate_data_type(self.data_type())?;
        T::from_bytes(
            self.data_type(),
            self.par_retrieve_array_subset(array_subset)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        array::{ArrayBuilder, DataType, FillValue},
        storage::{store::MemoryStore, ReadableStorageTraits, StoreKey, WritableStorageTraits},
    };

    use super::*;

    fn array(store: Arc<MemoryStore>) -> Array<MemoryStore> {
        ArrayBuilder::new(
            vec![4, 5],
            DataType::UInt16,
            vec![2, 3].try_into().unwrap(),
            FillValue::from(9u16),
        )
        .build(store, "/array")
        .unwrap()
    }

    #[test]
    fn array_retrieve_missing_chunk() {
        let store = Arc::new(MemoryStore::new());
        let array = array(store.clone());
        assert!(array.retrieve_chunk_if_exists(&[0, 0]).unwrap().is_none());
        assert_eq!(
            array.retrieve_chunk_elements::<u16>(&[1, 1]).unwrap(),
            vec![9u16; 6]
        );
        // reading a missing chunk does not create it
        assert!(!store
            .exists(&StoreKey::new("array/1.1").unwrap())
            .unwrap());
        assert!(matches!(
            array.retrieve_chunk(&[2, 0]),
            Err(ArrayError::InvalidChunkGridIndicesError(_))
        ));
        assert!(matches!(
            array.retrieve_chunk_elements::<i16>(&[0, 0]),
            Err(ArrayError::IncompatibleElementType)
        ));
    }

    #[test]
    fn array_retrieve_array_subset() {
        let store = Arc::new(MemoryStore::new());
        let array = array(store.clone());
        let elements: Vec<u16> = (0..6).collect();
        let encoded = array
            .chunk_codec()
            .encode(bytemuck::cast_slice(&elements).to_vec())
            .unwrap();
        store
            .set(&StoreKey::new("array/0.1").unwrap(), encoded.into())
            .unwrap();

        let subset = ArraySubset::new_with_ranges(&[1..3, 2..5]);
        let expected = vec![9, 3, 4, 9, 9, 9];
        assert_eq!(
            array.retrieve_array_subset_elements::<u16>(&subset).unwrap(),
            expected
        );
        assert_eq!(
            array
                .par_retrieve_array_subset_elements::<u16>(&subset)
                .unwrap(),
            expected
        );

        let empty = ArraySubset::new_with_ranges(&[1..1, 0..5]);
        assert!(array.retrieve_array_subset(&empty).unwrap().is_empty());

        let out_of_bounds = ArraySubset::new_with_ranges(&[0..5, 0..5]);
        assert!(matches!(
            array.retrieve_array_subset(&out_of_bounds),
            Err(ArrayError::InvalidArraySubset(_, _))
        ));
    }

    #[test]
    fn array_retrieve_corrupt_chunk() {
        let store = Arc::new(MemoryStore::new());
        let array = array(store.clone());
        store
            .set(&StoreKey::new("array/0.0").unwrap(), vec![0u8; 3].into())
            .unwrap();
        assert!(matches!(
            array.retrieve_chunk(&[0, 0]),
            Err(ArrayError::CodecError(_))
        ));
    }

    #[test]
    fn array_subset_too_large() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(
            vec![1 << 33, 1 << 33],
            DataType::UInt8,
            vec![1, 1].try_into().unwrap(),
            FillValue::from(0u8),
        )
        .build(store, "/")
        .unwrap();

        let full = ArraySubset::new_with_shape(vec![1 << 33, 1 << 33]);
        assert!(matches!(
            array.retrieve_array_subset(&full),
            Err(ArrayError::InvalidArraySubset(_, _))
        ));
        assert!(matches!(
            array.store_array_subset(&full, &[]),
            Err(ArrayError::InvalidArraySubset(_, _))
        ));
        assert!(array.chunks_in_array_subset(&full).is_err());

        let corner = ArraySubset::new_with_ranges(&[(1 << 33) - 2..1 << 33, 0..2]);
        array.store_array_subset(&corner, &[1, 2, 3, 4]).unwrap();
        assert_eq!(array.retrieve_array_subset(&corner).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(
            array
                .retrieve_array_subset(&ArraySubset::new_with_ranges(&[0..2, 0..2]))
                .unwrap(),
            vec![0; 4]
        );
        assert!(!array.chunk_grid.is_boundary_chunk(&[(1 << 33) - 1, 0]));
    }
}
