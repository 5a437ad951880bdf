use std::collections::BTreeSet;

use crate::{
    array::ChunkKeyEncoding,
    metadata::v2::{ArrayMetadataV2, GroupMetadataV2},
    node::NodePath,
};

use super::{
    data_key, meta_key_v2_array, meta_key_v2_attributes, meta_key_v2_group, Bytes, MaybeBytes,
    StorageError, StoreKey, StoreKeys, StorePrefix, StorePrefixes, ARRAY_METADATA_NAME,
    GROUP_METADATA_NAME,
};

/// Readable storage traits.
pub trait ReadableStorageTraits: Send + Sync {
    /// Retrieve the value (bytes) associated with a given [`StoreKey`].
    ///
    /// Returns [`None`] if the key is not found.
    /// Any other failure to read the key is an error, it is never reported as [`None`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError>;

    /// Return the size in bytes of the value at `key`.
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError>;

    /// Returns true if `key` exists.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn exists(&self, key: &StoreKey) -> Result<bool, StorageError> {
        Ok(self.size_key(key)?.is_some())
    }
}

/// Listable storage traits.
pub trait ListableStorageTraits: Send + Sync {
    /// Retrieve all [`StoreKeys`] in the store, in sorted order.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn list(&self) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] with a given [`StorePrefix`], in sorted order.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the prefix is not a directory or there is an underlying error with the store.
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;
}

/// Writable storage traits.
pub trait WritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`], replacing any existing value.
    ///
    /// The store creates whatever is needed to hold the key (e.g. parent directories).
    /// The value is durable when this returns successfully.
    ///
    /// # Errors
    /// Returns a [`StorageError`] on failure to store.
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Erase a [`StoreKey`].
    ///
    /// Succeeds if the key does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Erase all [`StoreKey`] under [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// A supertrait of [`ReadableStorageTraits`] and [`WritableStorageTraits`].
pub trait ReadableWritableStorageTraits: ReadableStorageTraits + WritableStorageTraits {}

impl<T> ReadableWritableStorageTraits for T where T: ReadableStorageTraits + WritableStorageTraits {}

/// A supertrait of [`ReadableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableListableStorageTraits: ReadableStorageTraits + ListableStorageTraits {}

impl<T> ReadableListableStorageTraits for T where T: ReadableStorageTraits + ListableStorageTraits {}

/// A supertrait of [`ReadableWritableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableWritableListableStorageTraits:
    ReadableWritableStorageTraits + ListableStorageTraits
{
}

impl<T> ReadableWritableListableStorageTraits for T where
    T: ReadableWritableStorageTraits + ListableStorageTraits
{
}

fn set_json<TStorage: ?Sized + WritableStorageTraits, T: serde::Serialize>(
    storage: &TStorage,
    key: &StoreKey,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
    storage.set(key, json.into())
}

/// Create a group.
///
/// Writes the group metadata (`.zgroup`), and the user attributes (`.zattrs`) if there are any.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn create_group<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    group: &GroupMetadataV2,
) -> Result<(), StorageError> {
    if !group.attributes.is_empty() {
        set_json(storage, &meta_key_v2_attributes(path), &group.attributes)?;
    }
    set_json(storage, &meta_key_v2_group(path), group)?;
    log::debug!("created group {path}");
    Ok(())
}

/// Create an array.
///
/// Writes the array metadata (`.zarray`), and the user attributes (`.zattrs`) if there are any.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn create_array<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    array: &ArrayMetadataV2,
) -> Result<(), StorageError> {
    if !array.attributes.is_empty() {
        set_json(storage, &meta_key_v2_attributes(path), &array.attributes)?;
    }
    set_json(storage, &meta_key_v2_array(path), array)?;
    log::debug!("created array {path}");
    Ok(())
}

/// Store an encoded chunk.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn store_chunk<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_grid_indices: &[u64],
    chunk_key_encoding: &ChunkKeyEncoding,
    chunk_serialised: Bytes,
) -> Result<(), StorageError> {
    storage.set(
        &data_key(array_path, chunk_grid_indices, chunk_key_encoding),
        chunk_serialised,
    )
}

/// Retrieve an encoded chunk, or [`None`] if it has never been written.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn retrieve_chunk<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_grid_indices: &[u64],
    chunk_key_encoding: &ChunkKeyEncoding,
) -> Result<MaybeBytes, StorageError> {
    storage.get(&data_key(
        array_path,
        chunk_grid_indices,
        chunk_key_encoding,
    ))
}

/// Erase a chunk.
///
/// Succeeds if the chunk does not exist.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn erase_chunk<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_grid_indices: &[u64],
    chunk_key_encoding: &ChunkKeyEncoding,
) -> Result<(), StorageError> {
    storage.erase(&data_key(
        array_path,
        chunk_grid_indices,
        chunk_key_encoding,
    ))
}

/// Delete `key` and, if it is also a container of other keys, everything under it.
///
/// Deleting a key that does not exist succeeds.
///
/// # Errors
/// Returns [`StorageError::DeleteFailed`] if `key` or a key under it still exists after deletion, or a [`StorageError`] if there is an underlying error with the store.
pub fn delete<TStorage: ?Sized + ReadableWritableListableStorageTraits>(
    storage: &TStorage,
    key: &StoreKey,
) -> Result<(), StorageError> {
    let prefix = key.to_prefix();
    storage.erase_prefix(&prefix)?;
    storage.erase(key)?;
    if storage.exists(key)? || !storage.list_prefix(&prefix)?.is_empty() {
        return Err(StorageError::DeleteFailed(key.clone()));
    }
    log::debug!("deleted {key}");
    Ok(())
}

/// Erase a node (group or array) and everything under it.
///
/// Erasing the root node erases the whole store.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn erase_node<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<(), StorageError> {
    storage.erase_prefix(&StorePrefix::from(path))
}

fn discover_keys_for<TStorage: ?Sized + ListableStorageTraits>(
    storage: &TStorage,
    metadata_file_name: &str,
) -> Result<StorePrefixes, StorageError> {
    let prefixes: BTreeSet<StorePrefix> = storage
        .list()?
        .into_iter()
        .filter(|key| key.name() == metadata_file_name)
        .map(|key| key.parent())
        .collect();
    Ok(prefixes.into_iter().collect())
}

/// Discover the arrays in a store.
///
/// Returns the prefix of every array with array metadata (`.zarray`), in sorted order.
/// The root array, if any, has the empty prefix.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn discover_array_keys<TStorage: ?Sized + ListableStorageTraits>(
    storage: &TStorage,
) -> Result<StorePrefixes, StorageError> {
    discover_keys_for(storage, ARRAY_METADATA_NAME)
}

/// Discover the groups in a store.
///
/// Returns the prefix of every group with group metadata (`.zgroup`), in sorted order.
/// The root group, if any, has the empty prefix.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn discover_group_keys<TStorage: ?Sized + ListableStorageTraits>(
    storage: &TStorage,
) -> Result<StorePrefixes, StorageError> {
    discover_keys_for(storage, GROUP_METADATA_NAME)
}
