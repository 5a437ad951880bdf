//! Zarr stores.
//!
//! A store is a backend holding the keys of a Zarr hierarchy:
//!  - [`FilesystemStore`]: a directory tree with one file per key, and
//!  - [`MemoryStore`]: an in-memory map, useful for testing.

mod store_sync;

pub use store_sync::filesystem_store::{FilesystemStore, FilesystemStoreCreateError};
pub use store_sync::memory_store::MemoryStore;
