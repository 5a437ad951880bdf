//! Zarr V2 metadata documents.

/// Zarr V2 group metadata.
pub mod group;

/// Zarr V2 array metadata.
pub mod array;

mod metadata;

pub use array::{ArrayMetadataV2, ArrayMetadataV2Order, FillValueMetadataV2};
pub use group::GroupMetadataV2;
pub use metadata::MetadataV2;
