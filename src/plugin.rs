//! Compile-time plugin registry.
//!
//! A [`Plugin`] creates an object from a [`MetadataV2`] descriptor (an `id` and its parameters).
//! Compressors are registered this way, see [`crate::array::codec`].
//!
//! Plugins are registered at compile time using the [inventory] crate.
//! At runtime, the name matching function of each registered plugin is tested against the descriptor `id`, and the first match creates the object.

use thiserror::Error;

use crate::metadata::v2::MetadataV2;

/// A plugin.
pub struct Plugin<TPlugin> {
    /// The identifier of the plugin.
    identifier: &'static str,
    /// Tests if the name is a match for this plugin.
    match_name_fn: fn(name: &str) -> bool,
    /// Create an implementation of this plugin from metadata.
    create_fn: fn(metadata: &MetadataV2) -> Result<TPlugin, PluginCreateError>,
}

/// A plugin creation error.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum PluginCreateError {
    /// No registered plugin matches the name.
    #[error("{plugin_type} {name} is not supported")]
    Unsupported { name: String, plugin_type: String },
    /// The descriptor parameters are invalid for the plugin.
    #[error("{plugin_type} {identifier} is unsupported with metadata: {metadata}")]
    MetadataInvalid {
        identifier: &'static str,
        plugin_type: &'static str,
        metadata: String,
    },
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl PluginCreateError {
    /// Create a [`PluginCreateError::MetadataInvalid`] error.
    #[must_use]
    pub fn metadata_invalid(
        identifier: &'static str,
        plugin_type: &'static str,
        metadata: &MetadataV2,
    ) -> Self {
        Self::MetadataInvalid {
            identifier,
            plugin_type,
            metadata: metadata.to_string(),
        }
    }
}

impl From<&str> for PluginCreateError {
    fn from(err_string: &str) -> Self {
        Self::Other(err_string.to_string())
    }
}

impl From<String> for PluginCreateError {
    fn from(err_string: String) -> Self {
        Self::Other(err_string)
    }
}

impl<TPlugin> Plugin<TPlugin> {
    /// Create a new plugin for registration.
    pub const fn new(
        identifier: &'static str,
        match_name_fn: fn(name: &str) -> bool,
        create_fn: fn(metadata: &MetadataV2) -> Result<TPlugin, PluginCreateError>,
    ) -> Self {
        Self {
            identifier,
            match_name_fn,
            create_fn,
        }
    }

    /// Create a `TPlugin` plugin from `metadata`.
    ///
    /// # Errors
    /// Returns a [`PluginCreateError`] if the parameters in `metadata` are invalid for this plugin.
    pub fn create(&self, metadata: &MetadataV2) -> Result<TPlugin, PluginCreateError> {
        (self.create_fn)(metadata)
    }

    /// Returns true if this plugin is associated with `name`.
    #[must_use]
    pub fn match_name(&self, name: &str) -> bool {
        (self.match_name_fn)(name)
    }

    /// Returns the identifier of the plugin.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }
}
