#![cfg(not(miri))]

use std::{error::Error, sync::Arc};

use rayon::prelude::*;
use zarrs_v2::{
    array::{Array, ArrayBuilder, DataType, FillValue},
    array_subset::ArraySubset,
    metadata::v2::GroupMetadataV2,
    node::NodePath,
    storage::{
        create_group, delete, discover_array_keys, discover_group_keys, erase_node,
        store::FilesystemStore, ListableStorageTraits, ReadableStorageTraits,
        ReadableWritableListableStorage, StoreKey, StorePrefix, WritableStorageTraits,
    },
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn filesystem_array_write_read() -> Result<(), Box<dyn Error>> {
    init_logger();
    let path = tempfile::TempDir::new()?;
    let store: ReadableWritableListableStorage = Arc::new(FilesystemStore::new(path.path())?);

    let array = ArrayBuilder::new(
        vec![6, 6],
        DataType::Int64,
        vec![4, 4].try_into()?,
        FillValue::from(-7i64),
    )
    .build(store.clone(), "/group/array")?;
    array.store_metadata()?;

    let elements: Vec<i64> = (0..36).collect();
    array.par_store_array_subset_elements(&ArraySubset::new_with_shape(vec![6, 6]), &elements)?;
    assert!(path.path().join("group/array/.zarray").is_file());
    assert!(path.path().join("group/array/1.1").is_file());

    // a fresh store over the same directory sees the same array
    let store = Arc::new(FilesystemStore::new(path.path())?);
    let array = Array::new(store, "/group/array")?;
    assert_eq!(
        array.retrieve_array_subset_elements::<i64>(&ArraySubset::new_with_shape(vec![6, 6]))?,
        elements
    );
    assert_eq!(
        array.retrieve_array_subset_elements::<i64>(&ArraySubset::new_with_ranges(&[3..5, 2..4]))?,
        vec![20, 21, 26, 27]
    );
    Ok(())
}

#[test]
fn filesystem_delete() -> Result<(), Box<dyn Error>> {
    init_logger();
    let path = tempfile::TempDir::new()?;
    let store = FilesystemStore::new(path.path())?;
    store.set(&"a/b/c".try_into()?, vec![1].into())?;
    store.set(&"a/b/d/e".try_into()?, vec![2].into())?;
    store.set(&"a/f".try_into()?, vec![3].into())?;

    // a key that is both absent as a value and a container of other keys
    delete(&store, &StoreKey::new("a/b")?)?;
    assert_eq!(store.list()?, vec![StoreKey::new("a/f")?]);
    assert!(!path.path().join("a/b").exists());

    // deleting a key that does not exist succeeds
    delete(&store, &StoreKey::new("a/b")?)?;

    delete(&store, &StoreKey::new("a/f")?)?;
    assert!(store.list()?.is_empty());
    assert!(path.path().exists());
    Ok(())
}

#[test]
fn filesystem_discover_nodes() -> Result<(), Box<dyn Error>> {
    init_logger();
    let path = tempfile::TempDir::new()?;
    let store = Arc::new(FilesystemStore::new(path.path())?);
    create_group(&*store, &NodePath::root(), &GroupMetadataV2::default())?;
    create_group(&*store, &"/b".try_into()?, &GroupMetadataV2::default())?;
    for array_path in ["/b/x", "/a", "/b/c/y"] {
        ArrayBuilder::new(
            vec![2],
            DataType::UInt8,
            vec![2].try_into()?,
            FillValue::from(0u8),
        )
        .build(store.clone(), array_path)?
        .store_metadata()?;
    }

    assert_eq!(
        discover_array_keys(&*store)?,
        vec![
            StorePrefix::new("a/")?,
            StorePrefix::new("b/c/y/")?,
            StorePrefix::new("b/x/")?,
        ]
    );
    assert_eq!(
        discover_group_keys(&*store)?,
        vec![StorePrefix::root(), StorePrefix::new("b/")?]
    );

    erase_node(&*store, &"/b".try_into()?)?;
    assert_eq!(discover_array_keys(&*store)?, vec![StorePrefix::new("a/")?]);
    assert_eq!(discover_group_keys(&*store)?, vec![StorePrefix::root()]);
    Ok(())
}

#[test]
fn filesystem_concurrent_writes() -> Result<(), Box<dyn Error>> {
    init_logger();
    let path = tempfile::TempDir::new()?;
    let store = FilesystemStore::new(path.path())?;
    let keys: Vec<StoreKey> = (0..64)
        .map(|i| StoreKey::new(format!("data/{}/{i}", i % 4)))
        .collect::<Result<_, _>>()?;

    keys.par_iter()
        .enumerate()
        .try_for_each(|(i, key)| store.set(key, vec![i as u8; 128].into()))?;

    // no partially written files are left behind, or listed
    assert_eq!(store.list()?.len(), keys.len());
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(store.get(key)?.unwrap().as_ref(), &[i as u8; 128]);
    }
    let files = walkdir::WalkDir::new(path.path())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count();
    assert_eq!(files, keys.len());
    Ok(())
}
