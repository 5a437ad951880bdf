//! Array subsets.
//!
//! An [`ArraySubset`] is a hyperrectangular region of an array, given by a start and a shape.
//! It is used to describe the region of an array-level read or write, the elements a chunk covers, and the overlap of the two.
//!
//! This module provides convenience functions for:
//!  - iterating over the indices of an array subset in row-major order, and
//!  - extracting or storing the bytes of an array subset within the bytes of a larger array.

use derive_more::Display;
use itertools::izip;
use thiserror::Error;

use crate::array::{compute_size, ArrayIndices, ArrayShape};

/// An array subset.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Default)]
#[display("start {start:?} shape {shape:?}")]
pub struct ArraySubset {
    /// The start of the array subset.
    start: ArrayIndices,
    /// The shape of the array subset.
    shape: ArrayShape,
}

/// An array extract bytes error.
#[derive(Debug, Error)]
#[error("array subset {_0} is incompatible with array of shape {_1:?} and element size {_2}")]
pub struct ArrayExtractBytesError(ArraySubset, ArrayShape, usize);

/// An array store bytes error.
#[derive(Debug, Error)]
pub enum ArrayStoreBytesError {
    /// Invalid array shape.
    #[error("array shape {_1:?} is incompatible with array subset {_0}")]
    InvalidArrayShape(ArraySubset, ArrayShape),
    /// Invalid subset bytes.
    #[error("expected subset bytes to have length {_1}, got {_0}")]
    InvalidSubsetBytes(usize, u64),
    /// Invalid array bytes.
    #[error("expected array bytes to have length {_1}, got {_0}")]
    InvalidArrayBytes(usize, u64),
}

impl ArraySubset {
    /// Create a new array subset with `shape` starting at the origin.
    #[must_use]
    pub fn new_with_shape(shape: ArrayShape) -> Self {
        Self {
            start: vec![0; shape.len()],
            shape,
        }
    }

    /// Create a new array subset.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the lengths of `start` and `shape` do not match.
    pub fn new_with_start_shape(
        start: ArrayIndices,
        shape: ArrayShape,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == shape.len() {
            Ok(Self { start, shape })
        } else {
            Err(IncompatibleDimensionalityError::new(
                start.len(),
                shape.len(),
            ))
        }
    }

    /// Create a new array subset from a list of [`Range`](std::ops::Range)s.
    ///
    /// An empty or reversed range gives a zero extent in that dimension.
    #[must_use]
    pub fn new_with_ranges(ranges: &[std::ops::Range<u64>]) -> Self {
        let start = ranges.iter().map(|range| range.start).collect();
        let shape = ranges
            .iter()
            .map(|range| range.end.saturating_sub(range.start))
            .collect();
        Self { start, shape }
    }

    /// Return the start of the array subset.
    #[must_use]
    pub fn start(&self) -> &[u64] {
        &self.start
    }

    /// Return the shape of the array subset.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the dimensionality of the array subset.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.start.len()
    }

    /// Return the end (exclusive) of the array subset.
    #[must_use]
    pub fn end_exc(&self) -> ArrayIndices {
        std::iter::zip(&self.start, &self.shape)
            .map(|(start, size)| start.saturating_add(*size))
            .collect()
    }

    /// Return the number of elements of the array subset.
    ///
    /// Equal to the product of the components of its shape, or [`None`] if that overflows a `u64`.
    #[must_use]
    pub fn num_elements(&self) -> Option<u64> {
        compute_size(&self.shape)
    }

    /// Returns true if the array subset contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape.iter().any(|&size| size == 0)
    }

    /// Returns true if the array subset is within the bounds of `array_shape`.
    #[must_use]
    pub fn inbounds(&self, array_shape: &[u64]) -> bool {
        self.dimensionality() == array_shape.len()
            && izip!(&self.start, &self.shape, array_shape)
                .all(|(start, size, extent)| start.checked_add(*size).is_some_and(|end| end <= *extent))
    }

    /// Return the overlap of this array subset with `subset_other`, in absolute coordinates.
    ///
    /// The overlap is empty if the subsets do not intersect.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the dimensionality of `subset_other` does not match.
    pub fn overlap(&self, subset_other: &Self) -> Result<Self, IncompatibleDimensionalityError> {
        if subset_other.dimensionality() != self.dimensionality() {
            return Err(IncompatibleDimensionalityError::new(
                subset_other.dimensionality(),
                self.dimensionality(),
            ));
        }
        let (start, shape) = izip!(
            &self.start,
            &self.shape,
            &subset_other.start,
            &subset_other.shape
        )
        .map(|(start, size, other_start, other_size)| {
            let overlap_start = std::cmp::max(*start, *other_start);
            let overlap_end = std::cmp::min(
                start.saturating_add(*size),
                other_start.saturating_add(*other_size),
            );
            (overlap_start, overlap_end.saturating_sub(overlap_start))
        })
        .unzip();
        Ok(Self { start, shape })
    }

    /// Return this array subset with its start made relative to `origin`.
    ///
    /// # Errors
    /// Returns an [`ArraySubsetError`] if the length of `origin` does not match the dimensionality, or `origin` lies after the start of the array subset in any dimension.
    pub fn relative_to(&self, origin: &[u64]) -> Result<Self, ArraySubsetError> {
        if origin.len() != self.dimensionality() {
            return Err(
                IncompatibleDimensionalityError::new(origin.len(), self.dimensionality()).into(),
            );
        }
        let start = std::iter::zip(&self.start, origin)
            .map(|(start, origin)| start.checked_sub(*origin).ok_or(InvalidArraySubsetError))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            start,
            shape: self.shape.clone(),
        })
    }

    /// Returns an iterator over the indices of elements within the subset, in row-major order.
    #[must_use]
    pub fn iter_indices(&self) -> IndicesIterator {
        IndicesIterator::new(self.clone())
    }

    /// Runs of elements of this subset that are contiguous in an array of `array_shape`.
    ///
    /// Each run is the linearised index of its first element in the array and its length in elements, in row-major order.
    /// The subset must be within the bounds of `array_shape`.
    fn contiguous_runs<'a>(
        &'a self,
        array_shape: &'a [u64],
    ) -> impl Iterator<Item = (u64, u64)> + 'a {
        let dimensionality = self.dimensionality();
        let mut run_dims = usize::from(dimensionality > 0);
        let mut run_length = self.shape.last().copied().unwrap_or(1);
        while run_dims < dimensionality {
            let dim = dimensionality - run_dims;
            if self.start[dim] != 0 || self.shape[dim] != array_shape[dim] {
                break;
            }
            run_dims += 1;
            run_length *= self.shape[dimensionality - run_dims];
        }
        let outer_dims = dimensionality - run_dims;
        let outer = Self {
            start: self.start[..outer_dims].to_vec(),
            shape: self.shape[..outer_dims].to_vec(),
        };
        let run_start = &self.start[outer_dims..];
        let empty = self.is_empty();
        outer
            .iter_indices()
            .filter(move |_| !empty)
            .map(move |outer_indices| {
                let indices = outer_indices.iter().chain(run_start);
                let linearised = std::iter::zip(indices, array_shape)
                    .fold(0, |acc, (index, extent)| acc * extent + index);
                (linearised, run_length)
            })
    }

    fn validate_bytes_shape(&self, array_shape: &[u64]) -> bool {
        self.inbounds(array_shape)
    }

    /// Return the bytes in this array subset from an array with shape `array_shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`ArrayExtractBytesError`] if the length of `array_shape` does not match the array subset dimensionality, the array subset is outside of the bounds of `array_shape`, or the length of `bytes` does not match `array_shape` and `element_size`.
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<Vec<u8>, ArrayExtractBytesError> {
        let err = || ArrayExtractBytesError(self.clone(), array_shape.to_vec(), element_size);
        let element_size_u64 = element_size as u64;
        if !self.validate_bytes_shape(array_shape)
            || Some(bytes.len() as u64) != num_bytes(array_shape, element_size_u64)
        {
            return Err(err());
        }
        // the subset is within the array, so its size is bounded by `bytes`
        let subset_size = num_bytes(&self.shape, element_size_u64)
            .and_then(|num_bytes| usize::try_from(num_bytes).ok())
            .ok_or_else(err)?;
        let mut bytes_subset = Vec::with_capacity(subset_size);
        for (array_index, contiguous_elements) in self.contiguous_runs(array_shape) {
            let byte_offset = usize::try_from(array_index * element_size_u64).map_err(|_| err())?;
            let byte_length =
                usize::try_from(contiguous_elements * element_size_u64).map_err(|_| err())?;
            bytes_subset.extend_from_slice(&bytes[byte_offset..byte_offset + byte_length]);
        }
        Ok(bytes_subset)
    }

    /// Store `bytes_subset`, the bytes of this array subset, into the bytes of an array (`bytes_array`) with shape `array_shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`ArrayStoreBytesError`] if:
    ///  - the length of `array_shape` does not match the array subset dimensionality or the array subset is outside of the bounds of `array_shape`,
    ///  - the length of `bytes_array` is not compatible with the `array_shape` and `element_size`, or
    ///  - the length of `bytes_subset` is not compatible with the shape of this subset and `element_size`.
    pub fn store_bytes(
        &self,
        bytes_subset: &[u8],
        bytes_array: &mut [u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<(), ArrayStoreBytesError> {
        let element_size_u64 = element_size as u64;
        if !self.validate_bytes_shape(array_shape) {
            return Err(ArrayStoreBytesError::InvalidArrayShape(
                self.clone(),
                array_shape.to_vec(),
            ));
        }
        let expected_subset_size = num_bytes(&self.shape, element_size_u64);
        let expected_array_size = num_bytes(array_shape, element_size_u64);
        if Some(bytes_subset.len() as u64) != expected_subset_size {
            return Err(ArrayStoreBytesError::InvalidSubsetBytes(
                bytes_subset.len(),
                expected_subset_size.unwrap_or(u64::MAX),
            ));
        } else if Some(bytes_array.len() as u64) != expected_array_size {
            return Err(ArrayStoreBytesError::InvalidArrayBytes(
                bytes_array.len(),
                expected_array_size.unwrap_or(u64::MAX),
            ));
        }

        // The lengths were validated above, so these conversions and slices are in range
        let mut offset = 0;
        for (array_index, contiguous_elements) in self.contiguous_runs(array_shape) {
            #[allow(clippy::cast_possible_truncation)]
            let byte_index = (array_index * element_size_u64) as usize;
            #[allow(clippy::cast_possible_truncation)]
            let byte_length = (contiguous_elements * element_size_u64) as usize;
            bytes_array[byte_index..byte_index + byte_length]
                .copy_from_slice(&bytes_subset[offset..offset + byte_length]);
            offset += byte_length;
        }
        Ok(())
    }
}

/// The number of bytes of elements of `element_size` in `shape`, or [`None`] on overflow.
fn num_bytes(shape: &[u64], element_size: u64) -> Option<u64> {
    compute_size(shape)?.checked_mul(element_size)
}

/// An iterator over the indices of an [`ArraySubset`] in row-major order.
///
/// The last dimension varies fastest.
/// A zero-dimensional subset has a single (empty) index.
pub struct IndicesIterator {
    subset: ArraySubset,
    next: Option<ArrayIndices>,
}

impl IndicesIterator {
    fn new(subset: ArraySubset) -> Self {
        let next = (!subset.is_empty()).then(|| subset.start.clone());
        Self { subset, next }
    }
}

impl Iterator for IndicesIterator {
    type Item = ArrayIndices;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut next = current.clone();
        for dim in (0..next.len()).rev() {
            next[dim] += 1;
            if next[dim] < self.subset.start[dim].saturating_add(self.subset.shape[dim]) {
                self.next = Some(next);
                break;
            }
            next[dim] = self.subset.start[dim];
        }
        Some(current)
    }
}

/// An incompatible dimensionality error.
#[derive(Copy, Clone, Debug, Error)]
#[error("incompatible dimensionality {0}, expected {1}")]
pub struct IncompatibleDimensionalityError(usize, usize);

impl IncompatibleDimensionalityError {
    /// Create a new incompatible dimensionality error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }
}

/// An invalid array subset error.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid array subset")]
pub struct InvalidArraySubsetError;

/// An array subset error.
#[derive(Copy, Clone, Debug, Error)]
pub enum ArraySubsetError {
    /// Incompatible dimensionality.
    #[error(transparent)]
    IncompatibleDimensionalityError(#[from] IncompatibleDimensionalityError),
    /// Invalid array subset.
    #[error(transparent)]
    InvalidArraySubsetError(#[from] InvalidArraySubsetError),
}
