//! Zarr V2 storage.
//!
//! A [store] is a map from [`StoreKey`]s to opaque byte values, such as a directory tree on a filesystem or an in-memory map.
//! This module defines the abstract store interfaces and functions that operate on them:
//!  - [`ReadableStorageTraits`]: retrieve the value of a key, with an absent key reported as [`None`] rather than an error.
//!  - [`WritableStorageTraits`]: set a key, creating whatever the backend needs to hold it, and erase keys or prefixes.
//!  - [`ListableStorageTraits`]: enumerate keys in sorted order.
//!
//! Array and group metadata is stored at the `.zarray`/`.zgroup` keys below the node path, with user attributes in `.zattrs`.
//! Chunks are stored at the node path joined with the encoded chunk grid indices, e.g. `group/array/1.2.3.42`.

mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

use std::sync::Arc;

use thiserror::Error;

use crate::{
    array::ChunkKeyEncoding,
    node::{NodePath, NodePathError},
};

pub use store_key::{StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

pub use self::storage_sync::{
    create_array, create_group, delete, discover_array_keys, discover_group_keys, erase_chunk,
    erase_node, retrieve_chunk, store_chunk, ListableStorageTraits, ReadableListableStorageTraits,
    ReadableStorageTraits, ReadableWritableListableStorageTraits, ReadableWritableStorageTraits,
    WritableStorageTraits,
};

/// The value of a key.
pub type Bytes = bytes::Bytes;

/// The value of a key, or [`None`] if the key does not exist.
pub type MaybeBytes = Option<Bytes>;

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

/// [`Arc`] wrapped writable storage.
pub type WritableStorage = Arc<dyn WritableStorageTraits>;

/// [`Arc`] wrapped listable storage.
pub type ListableStorage = Arc<dyn ListableStorageTraits>;

/// [`Arc`] wrapped readable and writable storage.
pub type ReadableWritableStorage = Arc<dyn ReadableWritableStorageTraits>;

/// [`Arc`] wrapped readable and listable storage.
pub type ReadableListableStorage = Arc<dyn ReadableListableStorageTraits>;

/// [`Arc`] wrapped readable, writable, and listable storage.
pub type ReadableWritableListableStorage = Arc<dyn ReadableWritableListableStorageTraits>;

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An error parsing the metadata for a key.
    #[error("error parsing metadata for {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store prefix.
    #[error("invalid store prefix {0}")]
    StorePrefixError(#[from] StorePrefixError),
    /// An invalid store key.
    #[error("invalid store key {0}")]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An invalid node path.
    #[error("invalid node path {0}")]
    NodePathError(#[from] NodePathError),
    /// A key still exists after it was deleted.
    #[error("unable to delete {0}, it still exists")]
    DeleteFailed(StoreKey),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// The name of the array metadata key.
pub const ARRAY_METADATA_NAME: &str = ".zarray";

/// The name of the group metadata key.
pub const GROUP_METADATA_NAME: &str = ".zgroup";

/// The name of the user attributes key.
pub const ATTRIBUTES_NAME: &str = ".zattrs";

/// Return the metadata key given a node path for a specified metadata file name (e.g. .zarray, .zgroup, .zattrs).
fn meta_key_any(path: &NodePath, metadata_file_name: &str) -> StoreKey {
    let prefix = StorePrefix::from(path);
    StoreKey::new_unchecked(format!("{}{metadata_file_name}", prefix.as_str()))
}

/// Return the array metadata key (.zarray) given a node path.
#[must_use]
pub fn meta_key_v2_array(path: &NodePath) -> StoreKey {
    meta_key_any(path, ARRAY_METADATA_NAME)
}

/// Return the group metadata key (.zgroup) given a node path.
#[must_use]
pub fn meta_key_v2_group(path: &NodePath) -> StoreKey {
    meta_key_any(path, GROUP_METADATA_NAME)
}

/// Return the user-defined attributes key (.zattrs) given a node path.
#[must_use]
pub fn meta_key_v2_attributes(path: &NodePath) -> StoreKey {
    meta_key_any(path, ATTRIBUTES_NAME)
}

/// Return the data key given a node path, chunk grid indices, and a chunk key encoding.
#[must_use]
pub fn data_key(
    path: &NodePath,
    chunk_grid_indices: &[u64],
    chunk_key_encoding: &ChunkKeyEncoding,
) -> StoreKey {
    let prefix = StorePrefix::from(path);
    let chunk_key = chunk_key_encoding.encode(chunk_grid_indices);
    StoreKey::new_unchecked(format!("{}{}", prefix.as_str(), chunk_key.as_str()))
}
