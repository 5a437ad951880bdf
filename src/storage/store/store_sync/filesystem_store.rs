//! A filesystem store.
//!
//! Each key is a file below the base path, with `/` separated key components mapped to directories.

use std::{
    collections::HashMap,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    config::global_config,
    storage::{
        Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
        StoreKeyError, StoreKeys, StorePrefix, WritableStorageTraits,
    },
};

/// The file name suffix of a value being written atomically.
const PARTIAL_WRITE_SUFFIX: &str = ".zarrs_v2_partial";

static PARTIAL_WRITE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A synchronous file system store.
#[derive(Debug)]
pub struct FilesystemStore {
    base_path: PathBuf,
    readonly: bool,
    files: Mutex<HashMap<StoreKey, Arc<RwLock<()>>>>,
}

impl FilesystemStore {
    /// Create a new file system store at a given `base_path`.
    ///
    /// # Errors
    /// Returns a [`FilesystemStoreCreateError`] if `base_directory`:
    ///   - is not valid, or
    ///   - it points to an existing file rather than a directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, FilesystemStoreCreateError> {
        let base_path = base_path.as_ref().to_path_buf();
        if base_path.to_str().is_none() {
            return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
        }

        let readonly = if base_path.exists() {
            // the path already exists, check if it is read only
            let md = std::fs::metadata(&base_path).map_err(FilesystemStoreCreateError::IOError)?;
            if !md.is_dir() {
                return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
            }
            md.permissions().readonly()
        } else {
            // the path does not exist, so try and create it. If this succeeds, the filesystem is not read only
            std::fs::create_dir_all(&base_path).map_err(FilesystemStoreCreateError::IOError)?;
            false
        };

        Ok(Self {
            base_path,
            readonly,
            files: Mutex::default(),
        })
    }

    /// Returns the base path of the store.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Maps a [`StoreKey`] to a filesystem [`PathBuf`].
    #[must_use]
    pub fn key_to_fspath(&self, key: &StoreKey) -> PathBuf {
        let mut path = self.base_path.clone();
        path.extend(key.as_str().split('/'));
        path
    }

    /// Maps a filesystem [`PathBuf`] to a [`StoreKey`].
    fn fspath_to_key(&self, path: &Path) -> Result<StoreKey, StoreKeyError> {
        let path = pathdiff::diff_paths(path, &self.base_path)
            .ok_or_else(|| StoreKeyError::from(path.to_string_lossy().to_string()))?;
        let components: Vec<_> = path
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect();
        StoreKey::new(components.join("/"))
    }

    /// Maps a store [`StorePrefix`] to a filesystem [`PathBuf`].
    #[must_use]
    pub fn prefix_to_fs_path(&self, prefix: &StorePrefix) -> PathBuf {
        let mut path = self.base_path.clone();
        path.extend(prefix.as_str().split('/').filter(|component| !component.is_empty()));
        path
    }

    fn get_file_mutex(&self, key: &StoreKey) -> Arc<RwLock<()>> {
        self.files
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::default()))
            .clone()
    }

    fn list_dir_files(&self, path: &Path) -> Result<StoreKeys, StorageError> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.io_error().is_some_and(is_not_found) {
                        continue;
                    }
                    return Err(StorageError::Other(err.to_string()));
                }
            };
            if entry.file_type().is_file()
                && !entry
                    .file_name()
                    .to_string_lossy()
                    .ends_with(PARTIAL_WRITE_SUFFIX)
            {
                keys.push(self.fspath_to_key(entry.path())?);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn write_file(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(value)?;
    file.flush()?;
    file.sync_all()
}

/// Returns true if `err` means the path does not exist, including when one of its ancestors is a file.
fn is_not_found(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

fn ignore_not_found(result: std::io::Result<()>) -> Result<(), StorageError> {
    match result {
        Err(err) if !is_not_found(&err) => Err(err.into()),
        _ => Ok(()),
    }
}

impl ReadableStorageTraits for FilesystemStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let file = self.get_file_mutex(key);
        let _lock = file.read();

        let key_path = self.key_to_fspath(key);
        match std::fs::read(&key_path) {
            Ok(value) => {
                log::trace!("get {key}: {} bytes", value.len());
                Ok(Some(value.into()))
            }
            Err(err) if is_not_found(&err) || key_path.is_dir() => {
                log::trace!("get {key}: not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        match std::fs::metadata(self.key_to_fspath(key)) {
            Ok(metadata) => Ok(metadata.is_file().then(|| metadata.len())),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl WritableStorageTraits for FilesystemStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let file = self.get_file_mutex(key);
        let _lock = file.write();

        // Create directories
        let key_path = self.key_to_fspath(key);
        if let Some(parent) = key_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        log::trace!("set {key}: {} bytes", value.len());
        if global_config().filesystem_atomic_write() {
            let mut partial_path = key_path.clone().into_os_string();
            partial_path.push(format!(
                ".{}.{}{PARTIAL_WRITE_SUFFIX}",
                std::process::id(),
                PARTIAL_WRITE_COUNTER.fetch_add(1, Ordering::Relaxed)
            ));
            let partial_path = PathBuf::from(partial_path);
            let result =
                write_file(&partial_path, &value).and_then(|()| std::fs::rename(&partial_path, &key_path));
            if let Err(err) = result {
                let _ = std::fs::remove_file(&partial_path);
                return Err(err.into());
            }
            log::debug!("atomically wrote {}", key_path.display());
            Ok(())
        } else {
            Ok(write_file(&key_path, &value)?)
        }
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let file = self.get_file_mutex(key);
        let _lock = file.write();

        log::trace!("erase {key}");
        let key_path = self.key_to_fspath(key);
        if key_path.is_dir() {
            // A directory is not a key, its contents are erased with erase_prefix
            return Ok(());
        }
        ignore_not_found(std::fs::remove_file(key_path))
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let _lock = self.files.lock(); // lock all operations

        log::trace!("erase prefix {prefix}");
        let prefix_path = self.prefix_to_fs_path(prefix);
        if prefix_path == self.base_path {
            // keep the base directory
            let entries = match std::fs::read_dir(&prefix_path) {
                Ok(entries) => entries,
                Err(err) if is_not_found(&err) => return Ok(()),
                Err(err) => return Err(err.into()),
            };
            for entry in entries {
                let path = entry?.path();
                if path.is_dir() {
                    ignore_not_found(std::fs::remove_dir_all(path))?;
                } else {
                    ignore_not_found(std::fs::remove_file(path))?;
                }
            }
            Ok(())
        } else {
            ignore_not_found(std::fs::remove_dir_all(prefix_path))
        }
    }
}

impl ListableStorageTraits for FilesystemStore {
    fn list(&self) -> Result<StoreKeys, StorageError> {
        self.list_dir_files(&self.base_path)
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let prefix_path = self.prefix_to_fs_path(prefix);
        if prefix_path.is_dir() {
            self.list_dir_files(&prefix_path)
        } else {
            Ok(Vec::new())
        }
    }
}

/// A filesystem store creation error.
#[derive(Debug, Error)]
pub enum FilesystemStoreCreateError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The path is not valid on this system.
    #[error("base path {0} is not valid")]
    InvalidBasePath(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem() -> Result<(), Box<dyn Error>> {
        let path = tempfile::TempDir::new()?;
        let store = FilesystemStore::new(path.path())?;
        super::super::test_util::store_write(&store)?;
        super::super::test_util::store_read(&store)?;
        super::super::test_util::store_list(&store)?;
        super::super::test_util::store_delete(&store)?;
        assert!(path.path().exists());
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem_layout() -> Result<(), Box<dyn Error>> {
        let path = tempfile::TempDir::new()?;
        let store = FilesystemStore::new(path.path())?;
        store.set(&"group/array/1.2".try_into()?, vec![1, 2, 3].into())?;
        assert_eq!(
            std::fs::read(path.path().join("group").join("array").join("1.2"))?,
            vec![1, 2, 3]
        );
        let partial_files = std::fs::read_dir(path.path().join("group").join("array"))?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(PARTIAL_WRITE_SUFFIX))
            .count();
        assert_eq!(partial_files, 0);

        // A directory is not a value
        assert!(store.get(&"group/array".try_into()?)?.is_none());
        assert!(store.size_key(&"group/array".try_into()?)?.is_none());
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem_base_path_is_file() -> Result<(), Box<dyn Error>> {
        let file = tempfile::NamedTempFile::new()?;
        assert!(FilesystemStore::new(file.path()).is_err());
        Ok(())
    }
}
