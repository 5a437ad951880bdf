//! A rust library for the storage core of the [Zarr V2](https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html) format for chunked multidimensional arrays.
//!
//! An array is split into a regular grid of chunks.
//! Each chunk is converted to the declared byte order, optionally compressed, and stored as one value of a key/value [store](storage).
//! Chunks that have never been written read as the fill value of the array.
//!
//! ## Getting Started
//! - [`array::Array`] and [`storage`] are good places to start.
//! - [`array::chunk_grid`] maps regions of an array to the chunks that hold them.
//! - [`array::codec`] encodes and decodes chunks.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use zarrs_v2::array::{ArrayBuilder, DataType, FillValue};
//! use zarrs_v2::array_subset::ArraySubset;
//!
//! # let store_dir = tempfile::TempDir::new()?;
//! let store: zarrs_v2::storage::ReadableWritableListableStorage =
//!     Arc::new(zarrs_v2::storage::store::FilesystemStore::new(store_dir.path())?);
//!
//! let array = ArrayBuilder::new(
//!     vec![8, 8], // array shape
//!     DataType::Float32,
//!     vec![4, 4].try_into()?, // chunk shape
//!     FillValue::from(0.0f32),
//! )
//! .build(store.clone(), "/group/array")?;
//! array.store_metadata()?;
//!
//! array.store_chunk_elements(&[0, 1], &[1.0f32; 16])?;
//! let row: Vec<f32> = array.retrieve_array_subset_elements(&ArraySubset::new_with_ranges(&[0..1, 2..6]))?;
//! assert_eq!(row, vec![0.0, 0.0, 1.0, 1.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - Compressors: `gzip`, `zlib`, `zstd`.
//!
//! ## Licence
//! `zarrs_v2` is licensed under either of
//!  - the Apache License, Version 2.0 [LICENSE-APACHE](./LICENCE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license [LICENSE-MIT](./LICENCE-MIT) or <http://opensource.org/licenses/MIT>, at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above, without any additional terms or conditions.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod array_subset;
pub mod config;
pub mod metadata;
pub mod node;
pub mod plugin;
pub mod storage;
