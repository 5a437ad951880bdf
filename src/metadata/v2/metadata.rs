use derive_more::Display;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A compressor (or filter) descriptor: an `id` and its parameters.
///
/// For example:
/// ```json
/// {
///     "id": "zlib",
///     "level": 1
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct MetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: serde_json::Map<String, serde_json::Value>,
}

impl MetadataV2 {
    /// Create a descriptor with an `id` and no parameters.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            configuration: serde_json::Map::default(),
        }
    }

    /// Create a descriptor with an `id` and the fields of `configuration` as its parameters.
    ///
    /// # Errors
    /// Returns a [`serde_json::Error`] if `configuration` does not serialise to a JSON object.
    pub fn new_with_serializable_configuration<TConfiguration: Serialize>(
        id: &str,
        configuration: &TConfiguration,
    ) -> Result<Self, serde_json::Error> {
        let configuration = serde_json::to_value(configuration)?;
        match configuration {
            serde_json::Value::Object(configuration) => Ok(Self {
                id: id.to_string(),
                configuration,
            }),
            _ => Err(serde::ser::Error::custom(
                "the configuration cannot be serialized to a JSON object",
            )),
        }
    }

    /// Return the "id" key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration, which includes all fields excluding the "id".
    #[must_use]
    pub fn configuration(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.configuration
    }

    /// Deserialise the configuration into a concrete configuration type.
    ///
    /// # Errors
    /// Returns a [`serde_json::Error`] if the configuration does not match `TConfiguration`.
    pub fn to_configuration<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.configuration.clone()))
    }
}
