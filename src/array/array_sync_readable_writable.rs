use rayon::prelude::*;

use crate::{array_subset::ArraySubset, storage::ReadableWritableStorageTraits};

use super::{Array, ArrayError, Element};

impl<TStorage: ?Sized + ReadableWritableStorageTraits> Array<TStorage> {
    /// Encode `chunk_subset_bytes` and store in `chunk_subset` of the chunk at `chunk_indices`.
    ///
    /// The chunk is read, the subset overwritten, and the chunk written back.
    /// A chunk that has never been written starts as the fill value.
    /// If `chunk_subset` covers the whole chunk, the chunk is written without being read.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - `chunk_subset` is not within the chunk,
    ///  - the length of `chunk_subset_bytes` does not match the size of `chunk_subset`,
    ///  - there is a codec encoding or decoding error, or
    ///  - an underlying store error.
    pub fn store_chunk_subset(
        &self,
        chunk_indices: &[u64],
        chunk_subset: &ArraySubset,
        chunk_subset_bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        let chunk_shape = self.chunk_grid.subset(chunk_indices)?.shape().to_vec();
        if !chunk_subset.inbounds(&chunk_shape) {
            return Err(ArrayError::InvalidArraySubset(
                chunk_subset.clone(),
                chunk_shape,
            ));
        }
        let expected_size = chunk_subset
            .num_elements()
            .and_then(|num_elements| num_elements.checked_mul(self.data_type().size() as u64));
        if Some(chunk_subset_bytes.len() as u64) != expected_size {
            return Err(ArrayError::InvalidBytesInputSize(
                chunk_subset_bytes.len(),
                expected_size.unwrap_or(u64::MAX),
            ));
        }

        if chunk_subset.shape() == chunk_shape.as_slice() {
            self.store_chunk(chunk_indices, chunk_subset_bytes)
        } else {
            let mut chunk_bytes = self.retrieve_chunk(chunk_indices)?;
            chunk_subset.store_bytes(
                &chunk_subset_bytes,
                &mut chunk_bytes,
                &chunk_shape,
                self.data_type().size(),
            )?;
            self.store_chunk(chunk_indices, chunk_bytes)
        }
    }

    /// Encode `chunk_subset_elements` and store in `chunk_subset` of the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the element type does not match the data type, or
    ///  - a [`store_chunk_subset`](Array::store_chunk_subset) error condition is met.
    pub fn store_chunk_subset_elements<T: Element>(
        &self,
        chunk_indices: &[u64],
        chunk_subset: &ArraySubset,
        chunk_subset_elements: &[T],
    ) -> Result<(), ArrayError> {
        let chunk_subset_bytes = T::into_bytes(self.data_type(), chunk_subset_elements)?;
        self.store_chunk_subset(chunk_indices, chunk_subset, chunk_subset_bytes)
    }

    /// Store the part of `subset_bytes` overlapping the chunk at `chunk_indices`.
    fn store_array_subset_in_chunk(
        &self,
        chunk_indices: &[u64],
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
    ) -> Result<(), ArrayError> {
        let chunk_subset_in_array = self.chunk_grid.subset(chunk_indices)?;
        let overlap = array_subset.overlap(&chunk_subset_in_array)?;
        let chunk_subset_bytes = overlap.relative_to(array_subset.start())?.extract_bytes(
            subset_bytes,
            array_subset.shape(),
            self.data_type().size(),
        )?;
        let array_subset_in_chunk_subset = overlap.relative_to(chunk_subset_in_array.start())?;
        self.store_chunk_subset(
            chunk_indices,
            &array_subset_in_chunk_subset,
            chunk_subset_bytes,
        )
    }

    fn _store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
        parallel: bool,
    ) -> Result<(), ArrayError> {
        let expected_size = self.array_subset_size(array_subset)?;
        if subset_bytes.len() != expected_size {
            return Err(ArrayError::InvalidBytesInputSize(
                subset_bytes.len(),
                expected_size as u64,
            ));
        }
        let chunks = self.chunks_in_array_subset(array_subset)?;

        let store_chunk = |chunk_indices: &Vec<u64>| {
            self.store_array_subset_in_chunk(chunk_indices, array_subset, subset_bytes)
        };
        if parallel && Self::parallel_chunks(chunks.len()) {
            chunks.par_iter().try_for_each(store_chunk)
        } else {
            chunks.iter().try_for_each(store_chunk)
        }
    }

    /// Encode `subset_bytes` and store in `array_subset`.
    ///
    /// Each chunk overlapping `array_subset` is read, updated, and written back.
    /// Prefer [`store_chunk`](Array::store_chunk) for whole chunks.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the dimensionality of `array_subset` does not match the array dimensionality,
    ///  - `array_subset` is not within the array shape,
    ///  - the length of `subset_bytes` does not match the expected length governed by the shape of the array subset and the data type size,
    ///  - there is a codec encoding or decoding error, or
    ///  - an underlying store error.
    pub fn store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
    ) -> Result<(), ArrayError> {
        self._store_array_subset(array_subset, subset_bytes, false)
    }

    /// Parallel version of [`Array::store_array_subset`].
    ///
    /// Chunks are written concurrently, and each chunk is written exactly once.
    #[allow(clippy::missing_errors_doc)]
    pub fn par_store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
    ) -> Result<(), ArrayError> {
        self._store_array_subset(array_subset, subset_bytes, true)
    }

    /// Encode `subset_elements` and store in `array_subset`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the element type does not match the data type, or
    ///  - a [`store_array_subset`](Array::store_array_subset) error condition is met.
    pub fn store_array_subset_elements<T: Element>(
        &self,
        array_subset: &ArraySubset,
        subset_elements: &[T],
    ) -> Result<(), ArrayError> {
        let subset_bytes = T::into_bytes(self.data_type(), subset_elements)?;
        self._store_array_subset(array_subset, &subset_bytes, false)
    }

    /// Parallel version of [`Array::store_array_subset_elements`].
    #[allow(clippy::missing_errors_doc)]
    pub fn par_store_array_subset_elements<T: Element>(
        &self,
        array_subset: &ArraySubset,
        subset_elements: &[T],
    ) -> Result<(), ArrayError> {
        let subset_bytes = T::into_bytes(self.data_type(), subset_elements)?;
        self._store_array_subset(array_subset, &subset_bytes, true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        array::{ArrayBuilder, DataType, FillValue},
        storage::{store::MemoryStore, ListableStorageTraits, StoreKey},
    };

    use super::*;

    fn array(store: Arc<MemoryStore>) -> Array<MemoryStore> {
        ArrayBuilder::new(
            vec![4, 4],
            DataType::Float32,
            vec![2, 2].try_into().unwrap(),
            FillValue::from(0.5f32),
        )
        .build(store, "/")
        .unwrap()
    }

    #[test]
    fn array_store_chunk_subset() {
        let store = Arc::new(MemoryStore::new());
        let array = array(store);
        array
            .store_chunk_subset_elements(
                &[1, 1],
                &ArraySubset::new_with_ranges(&[1..2, 0..2]),
                &[1.0f32, 2.0],
            )
            .unwrap();
        assert_eq!(
            array.retrieve_chunk_elements::<f32>(&[1, 1]).unwrap(),
            vec![0.5, 0.5, 1.0, 2.0]
        );
        assert!(matches!(
            array.store_chunk_subset_elements(
                &[1, 1],
                &ArraySubset::new_with_ranges(&[1..3, 0..2]),
                &[1.0f32; 4],
            ),
            Err(ArrayError::InvalidArraySubset(_, _))
        ));
        assert!(matches!(
            array.store_chunk_subset_elements(
                &[1, 1],
                &ArraySubset::new_with_ranges(&[0..1, 0..2]),
                &[1.0f32; 4],
            ),
            Err(ArrayError::InvalidBytesInputSize(16, 8))
        ));
    }

    #[test]
    fn array_store_array_subset() {
        let store = Arc::new(MemoryStore::new());
        let array = array(store.clone());
        let subset = ArraySubset::new_with_ranges(&[1..3, 1..4]);
        let elements: Vec<f32> = (0..6u8).map(f32::from).collect();
        array.store_array_subset_elements(&subset, &elements).unwrap();

        // every chunk overlapping the subset was written, the others were not
        assert_eq!(
            store.list().unwrap(),
            ["0.0", "0.1", "1.0", "1.1"]
                .into_iter()
                .map(|key| StoreKey::new(key).unwrap())
                .collect::<Vec<_>>()
        );
        assert_eq!(
            array.retrieve_chunk_elements::<f32>(&[0, 1]).unwrap(),
            vec![0.5, 0.5, 1.0, 2.0]
        );
        assert_eq!(
            array.retrieve_array_subset_elements::<f32>(&subset).unwrap(),
            elements
        );

        let all = ArraySubset::new_with_shape(vec![4, 4]);
        #[rustfmt::skip]
        let expected = vec![
            0.5, 0.5, 0.5, 0.5,
            0.5, 0.0, 1.0, 2.0,
            0.5, 3.0, 4.0, 5.0,
            0.5, 0.5, 0.5, 0.5,
        ];
        assert_eq!(
            array.retrieve_array_subset_elements::<f32>(&all).unwrap(),
            expected
        );
    }

    #[test]
    fn array_par_store_array_subset() {
        let store = Arc::new(MemoryStore::new());
        let array = array(store);
        let all = ArraySubset::new_with_shape(vec![4, 4]);
        let elements: Vec<f32> = (0..16u8).map(f32::from).collect();
        array.par_store_array_subset_elements(&all, &elements).unwrap();
        assert_eq!(
            array.par_retrieve_array_subset_elements::<f32>(&all).unwrap(),
            elements
        );
        assert_eq!(
            array.retrieve_chunk_elements::<f32>(&[1, 0]).unwrap(),
            vec![8.0, 9.0, 12.0, 13.0]
        );
    }

    #[test]
    fn array_store_array_subset_invalid() {
        let store = Arc::new(MemoryStore::new());
        let array = array(store.clone());
        assert!(matches!(
            array.store_array_subset_elements(
                &ArraySubset::new_with_ranges(&[3..5, 0..1]),
                &[1.0f32; 2]
            ),
            Err(ArrayError::InvalidArraySubset(_, _))
        ));
        assert!(matches!(
            array.store_array_subset_elements(&ArraySubset::new_with_ranges(&[0..2]), &[1.0f32; 2]),
            Err(ArrayError::InvalidArraySubset(_, _))
        ));
        assert!(matches!(
            array.store_array_subset(&ArraySubset::new_with_ranges(&[0..2, 0..2]), &[0u8; 15]),
            Err(ArrayError::InvalidBytesInputSize(15, 16))
        ));
        assert!(store.list().unwrap().is_empty());
    }
}
