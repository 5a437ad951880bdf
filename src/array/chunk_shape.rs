use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ArrayShape;

/// A zero value was passed where a non-zero value was required.
#[derive(Copy, Clone, Debug, Error)]
#[error("value must be non-zero")]
pub struct NonZeroError;

/// The shape of a chunk. All dimensions must be non-zero.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct ChunkShape(Vec<NonZeroU64>);

impl ChunkShape {
    /// Return the number of elements.
    ///
    /// Equal to the product of the components of its shape.
    /// Returns [`None`] if the product overflows a [`u64`].
    #[must_use]
    pub fn num_elements(&self) -> Option<u64> {
        self.0
            .iter()
            .try_fold(1u64, |acc, extent| acc.checked_mul(extent.get()))
    }

    /// Return the shape as an [`ArrayShape`].
    #[must_use]
    pub fn to_array_shape(&self) -> ArrayShape {
        self.0.iter().map(|extent| extent.get()).collect()
    }
}

impl From<ChunkShape> for Vec<NonZeroU64> {
    fn from(val: ChunkShape) -> Self {
        val.0
    }
}

impl std::ops::Deref for ChunkShape {
    type Target = [NonZeroU64];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<NonZeroU64>> for ChunkShape {
    fn from(value: Vec<NonZeroU64>) -> Self {
        ChunkShape(value)
    }
}

macro_rules! try_from_chunkshape {
    ( $t:ty ) => {
        impl TryFrom<$t> for ChunkShape {
            type Error = NonZeroError;
            fn try_from(value: $t) -> Result<Self, Self::Error> {
                Ok(ChunkShape(
                    value
                        .iter()
                        .map(|&i| NonZeroU64::new(i).ok_or(NonZeroError))
                        .collect::<Result<_, _>>()?,
                ))
            }
        }
    };
    ( $t:ty, $g:ident ) => {
        impl<const $g: usize> TryFrom<$t> for ChunkShape {
            type Error = NonZeroError;
            fn try_from(value: $t) -> Result<Self, Self::Error> {
                Ok(ChunkShape(
                    value
                        .iter()
                        .map(|&i| NonZeroU64::new(i).ok_or(NonZeroError))
                        .collect::<Result<_, _>>()?,
                ))
            }
        }
    };
}

try_from_chunkshape!(Vec<u64>);
try_from_chunkshape!(&[u64]);
try_from_chunkshape!([u64; N], N);
try_from_chunkshape!(&[u64; N], N);

/// The number of elements in an array or chunk of `shape`, accumulated in a [`u64`].
///
/// Returns [`None`] if the product overflows.
#[must_use]
pub fn compute_size(shape: &[u64]) -> Option<u64> {
    shape
        .iter()
        .try_fold(1u64, |acc, &extent| acc.checked_mul(extent))
}

/// The number of elements in an array or chunk of `shape`, accumulated in a [`u32`].
///
/// Returns [`None`] if an extent or the product exceeds [`u32::MAX`].
#[must_use]
pub fn compute_size_u32(shape: &[u64]) -> Option<u32> {
    shape.iter().try_fold(1u32, |acc, &extent| {
        acc.checked_mul(u32::try_from(extent).ok()?)
    })
}
