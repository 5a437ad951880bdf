use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Zarr V2 group metadata, the content of a `.zgroup` document.
///
/// ```json
/// {
///     "zarr_format": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct GroupMetadataV2 {
    /// An integer defining the version of the storage specification to which the group adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// Optional user attributes, stored separately in `.zattrs`.
    #[serde(skip)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl GroupMetadataV2 {
    /// Create group metadata with `attributes`.
    #[must_use]
    pub fn new(attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
            attributes,
        }
    }
}

impl Default for GroupMetadataV2 {
    fn default() -> Self {
        Self::new(serde_json::Map::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_metadata_v2() {
        let group: GroupMetadataV2 = serde_json::from_str(r#"{"zarr_format":2}"#).unwrap();
        assert!(group.attributes.is_empty());
        assert_eq!(group.to_string(), r#"{"zarr_format":2}"#);
        assert!(serde_json::from_str::<GroupMetadataV2>(r#"{"zarr_format":3}"#).is_err());
    }
}
