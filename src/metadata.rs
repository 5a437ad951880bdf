//! Metadata documents.
//!
//! Zarr V2 stores array metadata in `.zarray`, group metadata in `.zgroup`, and user attributes in `.zattrs`.
//! These are JSON documents, see [`v2`].

pub mod v2;
