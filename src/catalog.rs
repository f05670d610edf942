//! Catalog and resource data model.

use crate::value::PropertyMap;
use serde::{Deserialize, Serialize};

/// Property holding a resource's verbose source name.
pub const ORIGINAL_NAME_KEY: &str = "original-name";
/// Property holding a resource's physical unit.
pub const UNIT_KEY: &str = "unit";
/// Property holding a resource's group memberships.
pub const GROUPS_KEY: &str = "groups";

/// An ordered collection of resources plus catalog-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog identifier
    pub id: String,
    /// Catalog-level properties, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    /// Resources in catalog order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
}

impl Catalog {
    /// Create a catalog without properties.
    pub fn new(id: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            id: id.into(),
            properties: None,
            resources: Some(resources),
        }
    }

    /// Resources, or an empty slice when the catalog has none.
    pub fn resources(&self) -> &[Resource] {
        self.resources.as_deref().unwrap_or_default()
    }
}

/// A named entity inside a catalog, such as a data channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier
    pub id: String,
    /// Resource properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
}

impl Resource {
    /// Create a resource without properties.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: None,
        }
    }

    /// Attach a property map.
    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = Some(properties);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_parsing() {
        let json = r#"{
            "id": "/IN_MEMORY/TEST",
            "resources": [
                { "id": "T1", "properties": { "original-name": "T1 in degC" } },
                { "id": "V1" }
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.resources().len(), 2);
        assert!(catalog.properties.is_none());
        assert!(catalog.resources()[1].properties.is_none());
    }

    #[test]
    fn test_catalog_without_resources() {
        let catalog: Catalog = serde_json::from_str(r#"{ "id": "/A" }"#).unwrap();
        assert!(catalog.resources().is_empty());

        let out = serde_json::to_value(&catalog).unwrap();
        assert_eq!(out, serde_json::json!({ "id": "/A" }));
    }
}
