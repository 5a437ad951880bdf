//! Global configuration options.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the `zarrs_v2` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Chunk Concurrent Minimum
/// > default: `4`
///
/// The minimum number of chunks processed concurrently by the `par_` array methods.
///
/// ## Boundary Chunk Fill
/// > default: [`false`]
///
/// A boundary chunk is a chunk that extends past the array shape.
/// If enabled, elements of a boundary chunk that lie outside the array shape are reset to the fill value whenever the chunk is written.
/// Otherwise they are stored as they are found in the chunk buffer: the fill value for a chunk created by a partial write, or whatever was stored previously.
///
/// ## Filesystem Atomic Write
/// > default: [`true`]
///
/// If enabled, a [`FilesystemStore`](crate::storage::store::FilesystemStore) writes each value to a temporary file beside the key and renames it into place.
/// A concurrent reader then observes either the previous value or the new value, never a partial one.
#[derive(Debug)]
pub struct Config {
    chunk_concurrent_minimum: usize,
    boundary_chunk_fill: bool,
    filesystem_atomic_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chunk_concurrent_minimum: 4,
            boundary_chunk_fill: false,
            filesystem_atomic_write: true,
        }
    }
}

impl Config {
    /// Get the [chunk concurrent minimum](#chunk-concurrent-minimum) configuration.
    #[must_use]
    pub fn chunk_concurrent_minimum(&self) -> usize {
        self.chunk_concurrent_minimum
    }

    /// Set the [chunk concurrent minimum](#chunk-concurrent-minimum) configuration.
    pub fn set_chunk_concurrent_minimum(&mut self, concurrent_minimum: usize) {
        self.chunk_concurrent_minimum = concurrent_minimum;
    }

    /// Get the [boundary chunk fill](#boundary-chunk-fill) configuration.
    #[must_use]
    pub fn boundary_chunk_fill(&self) -> bool {
        self.boundary_chunk_fill
    }

    /// Set the [boundary chunk fill](#boundary-chunk-fill) configuration.
    pub fn set_boundary_chunk_fill(&mut self, boundary_chunk_fill: bool) {
        self.boundary_chunk_fill = boundary_chunk_fill;
    }

    /// Get the [filesystem atomic write](#filesystem-atomic-write) configuration.
    #[must_use]
    pub fn filesystem_atomic_write(&self) -> bool {
        self.filesystem_atomic_write
    }

    /// Set the [filesystem atomic write](#filesystem-atomic-write) configuration.
    pub fn set_filesystem_atomic_write(&mut self, filesystem_atomic_write: bool) {
        self.filesystem_atomic_write = filesystem_atomic_write;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// Holding the guard blocks [`global_config_mut`] on any thread, including the current one.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global configuration.
///
/// Holding the guard blocks [`global_config`] on any thread, including the current one.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}
