//! Configuration types for the catalog transform engine.

use serde::{Deserialize, Serialize};

/// Full declarative transform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformSettings {
    /// Configuration version
    pub version: String,
    /// Identifier rewrites, chained in order
    #[serde(alias = "IdTransforms")]
    pub id_transforms: Option<Vec<IdTransform>>,
    /// Property rewrites, applied in order
    #[serde(alias = "PropertyTransforms")]
    pub property_transforms: Option<Vec<PropertyTransform>>,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            id_transforms: None,
            property_transforms: None,
        }
    }
}

impl TransformSettings {
    /// Whether no rule of any kind is configured.
    pub fn is_empty(&self) -> bool {
        self.id_transforms.as_ref().is_none_or(Vec::is_empty)
            && self.property_transforms.as_ref().is_none_or(Vec::is_empty)
    }
}

/// Identifier rewrite rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdTransform {
    /// Regex matched against the current identifier
    #[serde(alias = "SourcePattern")]
    pub source_pattern: String,
    /// Replacement template (defaults to `$1`)
    #[serde(default, alias = "TargetTemplate")]
    pub target_template: Option<String>,
}

/// Property rewrite rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTransform {
    /// Write semantics
    #[serde(default, alias = "Operation")]
    pub operation: TransformOperation,
    /// Slash-delimited path of the source value
    #[serde(alias = "SourcePath")]
    pub source_path: String,
    /// Regex matched against the source value
    #[serde(alias = "SourcePattern")]
    pub source_pattern: String,
    /// Property to write; the resource identifier when absent
    #[serde(default, alias = "TargetProperty")]
    pub target_property: Option<String>,
    /// Replacement template (defaults to `$1`, may contain `${path}` variables)
    #[serde(default, alias = "TargetTemplate")]
    pub target_template: Option<String>,
    /// Split the result into a string array on this delimiter
    #[serde(default, alias = "Separator")]
    pub separator: Option<String>,
}

/// How a property transform treats an existing target value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum TransformOperation {
    /// Always overwrite the target
    #[default]
    #[serde(alias = "set_always")]
    SetAlways,
    /// Only write when the target holds no value (explicit null counts as none)
    #[serde(alias = "set_if_not_exists")]
    SetIfNotExists,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = TransformSettings::default();
        assert_eq!(settings.version, "1");
        assert!(settings.id_transforms.is_none());
        assert!(settings.is_empty());
    }

    #[test]
    fn test_settings_parsing() {
        let yaml = r#"
version: "1"
idTransforms:
  - sourcePattern: "(.*)_avg"
propertyTransforms:
  - sourcePath: "original-name"
    sourcePattern: '^.*in\s(.*)'
    targetProperty: "unit"
  - operation: SetIfNotExists
    sourcePath: "original-name"
    sourcePattern: '.*'
    targetProperty: "description"
    targetTemplate: "$0"
    separator: ";"
"#;
        let settings: TransformSettings = serde_yaml::from_str(yaml).unwrap();
        let ids = settings.id_transforms.as_ref().unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids[0].target_template.is_none());

        let props = settings.property_transforms.as_ref().unwrap();
        assert_eq!(props[0].operation, TransformOperation::SetAlways);
        assert_eq!(props[0].target_property.as_deref(), Some("unit"));
        assert_eq!(props[1].operation, TransformOperation::SetIfNotExists);
        assert_eq!(props[1].separator.as_deref(), Some(";"));
        assert!(!settings.is_empty());
    }

    #[test]
    fn test_pascal_case_parsing() {
        let json = r#"{
            "IdTransforms": [{ "SourcePattern": "(.*)", "TargetTemplate": null }],
            "PropertyTransforms": [{
                "Operation": "SetIfNotExists",
                "SourcePath": "original-name",
                "SourcePattern": "(.*)",
                "TargetProperty": null
            }]
        }"#;
        let settings: TransformSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.id_transforms.unwrap().len(), 1);
        let props = settings.property_transforms.unwrap();
        assert_eq!(props[0].operation, TransformOperation::SetIfNotExists);
        assert!(props[0].target_property.is_none());
    }

    #[test]
    fn test_missing_source_path_rejected() {
        let json = r#"{ "propertyTransforms": [{ "sourcePattern": "(.*)" }] }"#;
        let err = serde_json::from_str::<TransformSettings>(json).unwrap_err();
        assert!(err.to_string().contains("sourcePath"));
    }

    #[test]
    fn test_null_lists_mean_no_rules() {
        let json = r#"{ "idTransforms": null, "propertyTransforms": [] }"#;
        let settings: TransformSettings = serde_json::from_str(json).unwrap();
        assert!(settings.is_empty());
    }
}
