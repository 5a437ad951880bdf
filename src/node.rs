//! Node paths.
//!
//! Arrays and groups live at a [`NodePath`] within a store.
//! The path `/` is the store root, and `/a/b` maps onto the store prefix `a/b/`.

mod node_path;

pub use node_path::{NodePath, NodePathError};
