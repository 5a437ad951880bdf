//! The regular chunk grid and the chunk indexer.
//!
//! An array of shape `shape` is partitioned into chunks of shape `chunk_shape`.
//! The grid has `ceil(shape[i] / chunk_shape[i])` chunks along dimension `i`.
//! Chunks on the upper boundary of the grid may extend past `shape`.
//!
//! [`compute_chunk_indices`] maps a requested region of the array to the chunks it overlaps.

use thiserror::Error;

use crate::array_subset::{ArraySubset, IncompatibleDimensionalityError};

use super::{ArrayIndices, ArrayShape, ChunkShape};

/// Malformed input to [`compute_chunk_indices`].
#[derive(Clone, Debug, Error)]
pub enum ChunkIndicesError {
    /// The inputs do not all have the same dimensionality.
    #[error(transparent)]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
    /// A chunk extent is zero.
    #[error("chunk shape {_0:?} has a zero extent")]
    ZeroChunkExtent(ArrayShape),
    /// The requested region extends past the array shape.
    #[error("region with offset {_0:?} and shape {_1:?} is outside of array shape {_2:?}")]
    OutOfBounds(ArrayIndices, ArrayShape, ArrayShape),
    /// The requested region overlaps more chunks than can be addressed in memory.
    #[error("region with offset {_0:?} and shape {_1:?} overlaps too many chunks")]
    TooManyChunks(ArrayIndices, ArrayShape),
}

/// Invalid chunk grid indices.
#[derive(Clone, Debug, Error)]
#[error("invalid chunk grid indices {_0:?} for a chunk grid of shape {_1:?}")]
pub struct InvalidChunkGridIndicesError(ArrayIndices, ArrayShape);

/// Compute the indices of every chunk overlapped by the region of `buffer_shape` at `offset`.
///
/// Along dimension `i` the region covers chunks `offset[i] / chunk_shape[i]` through `(offset[i] + buffer_shape[i] - 1) / chunk_shape[i]` inclusive.
/// The result is the cartesian product of these ranges in row-major order (the last dimension varies fastest), with no duplicates.
/// It is empty if any extent of `buffer_shape` is zero.
///
/// # Errors
/// Returns a [`ChunkIndicesError`] if the dimensionality of the inputs differs, a chunk extent is zero, or the region is not within `shape`.
pub fn compute_chunk_indices(
    shape: &[u64],
    chunk_shape: &[u64],
    buffer_shape: &[u64],
    offset: &[u64],
) -> Result<Vec<ArrayIndices>, ChunkIndicesError> {
    let dimensionality = shape.len();
    for len in [chunk_shape.len(), buffer_shape.len(), offset.len()] {
        if len != dimensionality {
            return Err(IncompatibleDimensionalityError::new(len, dimensionality).into());
        }
    }
    if chunk_shape.contains(&0) {
        return Err(ChunkIndicesError::ZeroChunkExtent(chunk_shape.to_vec()));
    }
    let region = ArraySubset::new_with_start_shape(offset.to_vec(), buffer_shape.to_vec())?;
    if !region.inbounds(shape) {
        return Err(ChunkIndicesError::OutOfBounds(
            offset.to_vec(),
            buffer_shape.to_vec(),
            shape.to_vec(),
        ));
    }
    if region.is_empty() {
        return Ok(Vec::new());
    }

    let ranges: Vec<_> = itertools::izip!(offset, buffer_shape, chunk_shape)
        .map(|(&offset, &size, &chunk)| {
            let lo = offset / chunk;
            let hi = (offset + size - 1) / chunk;
            lo..hi + 1
        })
        .collect();
    let chunks = ArraySubset::new_with_ranges(&ranges);
    chunks
        .num_elements()
        .and_then(|num_chunks| usize::try_from(num_chunks).ok())
        .ok_or_else(|| ChunkIndicesError::TooManyChunks(offset.to_vec(), buffer_shape.to_vec()))?;
    Ok(chunks.iter_indices().collect())
}

/// A regular chunk grid over an array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegularChunkGrid {
    array_shape: ArrayShape,
    chunk_shape: ChunkShape,
}

impl RegularChunkGrid {
    /// Create a new regular chunk grid.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the dimensionality of `chunk_shape` does not match `array_shape`.
    pub fn new(
        array_shape: ArrayShape,
        chunk_shape: ChunkShape,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if array_shape.len() == chunk_shape.len() {
            Ok(Self {
                array_shape,
                chunk_shape,
            })
        } else {
            Err(IncompatibleDimensionalityError::new(
                chunk_shape.len(),
                array_shape.len(),
            ))
        }
    }

    /// The array shape.
    #[must_use]
    pub fn array_shape(&self) -> &[u64] {
        &self.array_shape
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &ChunkShape {
        &self.chunk_shape
    }

    /// The number of chunks along each dimension.
    #[must_use]
    pub fn grid_shape(&self) -> ArrayShape {
        std::iter::zip(&self.array_shape, self.chunk_shape.iter())
            .map(|(&extent, chunk)| extent.div_ceil(chunk.get()))
            .collect()
    }

    /// Returns true if `chunk_indices` address a chunk of the grid.
    #[must_use]
    pub fn chunk_indices_inbounds(&self, chunk_indices: &[u64]) -> bool {
        chunk_indices.len() == self.array_shape.len()
            && std::iter::zip(chunk_indices, self.grid_shape()).all(|(&index, extent)| index < extent)
    }

    /// The region of the array covered by the chunk at `chunk_indices`, which may extend past the array shape.
    ///
    /// # Errors
    /// Returns [`InvalidChunkGridIndicesError`] if `chunk_indices` are not within the grid or the chunk ends past [`u64::MAX`].
    pub fn subset(&self, chunk_indices: &[u64]) -> Result<ArraySubset, InvalidChunkGridIndicesError> {
        if !self.chunk_indices_inbounds(chunk_indices) {
            return Err(InvalidChunkGridIndicesError(
                chunk_indices.to_vec(),
                self.grid_shape(),
            ));
        }
        // a chunk within the grid starts within the array, but may end past u64::MAX
        let ranges = std::iter::zip(chunk_indices, self.chunk_shape.iter())
            .map(|(&index, chunk)| {
                let start = index * chunk.get();
                start.checked_add(chunk.get()).map(|end| start..end)
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                InvalidChunkGridIndicesError(chunk_indices.to_vec(), self.grid_shape())
            })?;
        Ok(ArraySubset::new_with_ranges(&ranges))
    }

    /// Returns true if the chunk at `chunk_indices` extends past the array shape.
    #[must_use]
    pub fn is_boundary_chunk(&self, chunk_indices: &[u64]) -> bool {
        std::iter::zip(chunk_indices, std::iter::zip(&self.array_shape, self.chunk_shape.iter()))
            .any(|(&index, (&extent, chunk))| {
                index
                    .checked_add(1)
                    .and_then(|end| end.checked_mul(chunk.get()))
                    .map_or(true, |end| end > extent)
            })
    }

    /// The indices of the chunks overlapping `array_subset`, see [`compute_chunk_indices`].
    ///
    /// # Errors
    /// Returns a [`ChunkIndicesError`] if `array_subset` does not match the grid dimensionality or is not within the array shape.
    pub fn chunks_in_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<ArrayIndices>, ChunkIndicesError> {
        compute_chunk_indices(
            &self.array_shape,
            &self.chunk_shape.to_array_shape(),
            array_subset.shape(),
            array_subset.start(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: [u64; 2] = [2000, 3000];
    const CHUNKS: [u64; 2] = [512, 512];

    #[test]
    fn chunk_indices_single_chunk() {
        let indices = compute_chunk_indices(&SHAPE, &CHUNKS, &[512, 512], &[512, 512]).unwrap();
        assert_eq!(indices, vec![vec![1, 1]]);
    }

    #[test]
    fn chunk_indices_two_chunks() {
        let indices = compute_chunk_indices(&SHAPE, &CHUNKS, &[512, 512], &[512, 600]).unwrap();
        assert_eq!(indices, vec![vec![1, 1], vec![1, 2]]);
    }

    #[test]
    fn chunk_indices_four_chunks() {
        let indices = compute_chunk_indices(&SHAPE, &CHUNKS, &[512, 512], &[600, 600]).unwrap();
        assert_eq!(
            indices,
            vec![vec![1, 1], vec![1, 2], vec![2, 1], vec![2, 2]]
        );
    }

    #[test]
    fn chunk_indices_empty_region() {
        let indices = compute_chunk_indices(&SHAPE, &CHUNKS, &[0, 512], &[0, 0]).unwrap();
        assert!(indices.is_empty());
    }

    #[test]
    fn chunk_indices_malformed() {
        assert!(matches!(
            compute_chunk_indices(&SHAPE, &[512], &[1, 1], &[0, 0]),
            Err(ChunkIndicesError::IncompatibleDimensionality(_))
        ));
        assert!(matches!(
            compute_chunk_indices(&SHAPE, &[512, 0], &[1, 1], &[0, 0]),
            Err(ChunkIndicesError::ZeroChunkExtent(_))
        ));
        assert!(matches!(
            compute_chunk_indices(&SHAPE, &CHUNKS, &[512, 512], &[1600, 0]),
            Err(ChunkIndicesError::OutOfBounds(..))
        ));
    }

    #[test]
    fn chunk_indices_cover_region_exactly() {
        let shape = [13, 7, 5];
        let chunks = [4, 3, 2];
        let offset = [2, 1, 0];
        let buffer = [9, 6, 5];
        let indices = compute_chunk_indices(&shape, &chunks, &buffer, &offset).unwrap();
        let grid = RegularChunkGrid::new(shape.to_vec(), chunks.try_into().unwrap()).unwrap();
        let region = ArraySubset::new_with_start_shape(offset.to_vec(), buffer.to_vec()).unwrap();

        let mut sorted = indices.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, indices, "row-major order without duplicates");

        let covered: u64 = indices
            .iter()
            .map(|chunk_indices| {
                let chunk_subset = grid.subset(chunk_indices).unwrap();
                let overlap = chunk_subset.overlap(&region).unwrap();
                assert!(!overlap.is_empty());
                overlap.num_elements().unwrap()
            })
            .sum();
        assert_eq!(Some(covered), region.num_elements());

        let again = compute_chunk_indices(&shape, &chunks, &buffer, &offset).unwrap();
        assert_eq!(again, indices);
    }

    #[test]
    fn regular_chunk_grid() {
        let grid = RegularChunkGrid::new(vec![10, 15], vec![5, 6].try_into().unwrap()).unwrap();
        assert_eq!(grid.grid_shape(), vec![2, 3]);
        assert!(grid.chunk_indices_inbounds(&[1, 2]));
        assert!(!grid.chunk_indices_inbounds(&[2, 0]));
        assert!(!grid.chunk_indices_inbounds(&[0]));
        assert_eq!(
            grid.subset(&[1, 2]).unwrap(),
            ArraySubset::new_with_ranges(&[5..10, 12..18])
        );
        assert!(grid.subset(&[0, 3]).is_err());
        assert!(grid.is_boundary_chunk(&[1, 2]));
        assert!(!grid.is_boundary_chunk(&[1, 1]));
        assert!(RegularChunkGrid::new(vec![10], vec![5, 6].try_into().unwrap()).is_err());
    }

    #[test]
    fn chunk_indices_too_many_chunks() {
        assert!(matches!(
            compute_chunk_indices(&[1 << 33, 1 << 33], &[1, 1], &[1 << 33, 1 << 33], &[0, 0]),
            Err(ChunkIndicesError::TooManyChunks(_, _))
        ));
        let indices =
            compute_chunk_indices(&[1 << 33, 1 << 33], &[1, 1], &[1, 2], &[(1 << 33) - 1, 0])
                .unwrap();
        assert_eq!(indices, vec![vec![(1 << 33) - 1, 0], vec![(1 << 33) - 1, 1]]);
    }

    #[test]
    fn regular_chunk_grid_extreme_extents() {
        let grid =
            RegularChunkGrid::new(vec![u64::MAX], vec![1 << 63].try_into().unwrap()).unwrap();
        assert_eq!(grid.grid_shape(), vec![2]);
        assert!(!grid.is_boundary_chunk(&[0]));
        assert!(grid.is_boundary_chunk(&[1]));
        // the last chunk ends past u64::MAX
        assert!(grid.subset(&[1]).is_err());

        let grid = RegularChunkGrid::new(vec![u64::MAX - 1], vec![u64::MAX - 1].try_into().unwrap())
            .unwrap();
        assert_eq!(
            grid.subset(&[0]).unwrap(),
            ArraySubset::new_with_ranges(&[0..u64::MAX - 1])
        );
        assert!(!grid.is_boundary_chunk(&[0]));
    }

    #[test]
    fn regular_chunk_grid_zero_dimensional() {
        let grid = RegularChunkGrid::new(vec![], Vec::<u64>::new().try_into().unwrap()).unwrap();
        assert!(grid.grid_shape().is_empty());
        let chunks = grid
            .chunks_in_array_subset(&ArraySubset::new_with_shape(vec![]))
            .unwrap();
        assert_eq!(chunks, vec![Vec::<u64>::new()]);
    }
}
