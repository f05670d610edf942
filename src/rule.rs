//! Compiled transform rule chain.

use crate::catalog::Resource;
use crate::config::TransformSettings;
use crate::context::TransformContext;
use crate::path::PathCache;
use crate::transformer::{
    IdTransformer, PropertyTransformer, ResourceState, TransformOutcome, Transformer,
};
use tracing::{debug, trace};

/// Ordered, immutable rule chain built once from [`TransformSettings`].
#[derive(Debug, Default)]
pub struct TransformChain {
    /// Property rules, applied first
    property_rules: Vec<PropertyTransformer>,
    /// Identifier rules, chained after the property phase
    id_rules: Vec<IdTransformer>,
    /// Path segment cache shared by every resource
    paths: PathCache,
}

/// A transformed resource plus what happened to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutput {
    pub resource: Resource,
    /// Rules that wrote their target
    pub applied: usize,
    /// Rules that were skipped
    pub skipped: usize,
}

impl TransformChain {
    /// Compile the chain, validating every rule.
    pub fn new(settings: &TransformSettings) -> Result<Self, RuleError> {
        let paths = PathCache::new();

        let property_rules = settings
            .property_transforms
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, config)| {
                if config.source_path.is_empty() {
                    return Err(RuleError::MissingSourcePath { index });
                }
                PropertyTransformer::new(config, &paths).map_err(|source| {
                    RuleError::InvalidPattern {
                        kind: RuleKind::Property,
                        index,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let id_rules = settings
            .id_transforms
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, config)| {
                IdTransformer::new(config).map_err(|source| RuleError::InvalidPattern {
                    kind: RuleKind::Id,
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            property_rules,
            id_rules,
            paths,
        })
    }

    /// Whether the chain holds no rules at all.
    pub fn is_empty(&self) -> bool {
        self.property_rules.is_empty() && self.id_rules.is_empty()
    }

    /// Number of rules in the chain.
    pub fn len(&self) -> usize {
        self.property_rules.len() + self.id_rules.len()
    }

    /// The shared path segment cache.
    pub fn paths(&self) -> &PathCache {
        &self.paths
    }

    /// Run the chain against one resource, leaving the input untouched.
    pub fn apply(&self, resource: &Resource) -> ChainOutput {
        let ctx = TransformContext::new(resource.properties.as_ref(), &self.paths);
        let mut state = ResourceState::new(resource.id.clone(), ctx.original());
        let mut applied = 0;
        let mut skipped = 0;

        let rules = self
            .property_rules
            .iter()
            .map(|rule| rule as &dyn Transformer)
            .chain(self.id_rules.iter().map(|rule| rule as &dyn Transformer));

        for (index, rule) in rules.enumerate() {
            let outcome = rule.transform(&mut state, &ctx);
            match outcome {
                TransformOutcome::Applied => {
                    applied += 1;
                    trace!(
                        resource = %resource.id,
                        rule = index,
                        transformer = rule.name(),
                        id = %state.id,
                        "Rule applied"
                    );
                }
                TransformOutcome::Skipped(reason) => {
                    skipped += 1;
                    debug!(
                        resource = %resource.id,
                        rule = index,
                        transformer = rule.name(),
                        %reason,
                        "Rule skipped"
                    );
                }
            }
        }

        let id = state.id.clone();
        let properties = match state.into_modified() {
            Some(map) => Some(map),
            None => resource.properties.clone(),
        };

        ChainOutput {
            resource: Resource { id, properties },
            applied,
            skipped,
        }
    }

    /// Run the chain and keep only the transformed resource.
    pub fn transform(&self, resource: &Resource) -> Resource {
        self.apply(resource).resource
    }
}

/// Which rule list a configuration error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Id,
    Property,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id => f.write_str("id transform"),
            Self::Property => f.write_str("property transform"),
        }
    }
}

/// Errors that can occur while compiling the rule chain.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid regex pattern in {kind} #{index}: {source}")]
    InvalidPattern {
        kind: RuleKind,
        index: usize,
        #[source]
        source: regex::Error,
    },

    #[error("Property transform #{index} has no source path")]
    MissingSourcePath { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GROUPS_KEY, ORIGINAL_NAME_KEY, UNIT_KEY};
    use crate::config::{IdTransform, PropertyTransform, TransformOperation};
    use crate::value::{self, PropertyMap};

    fn property_rule(
        pattern: &str,
        target: Option<&str>,
        template: Option<&str>,
    ) -> PropertyTransform {
        PropertyTransform {
            operation: TransformOperation::SetAlways,
            source_path: ORIGINAL_NAME_KEY.to_string(),
            source_pattern: pattern.to_string(),
            target_property: target.map(str::to_string),
            target_template: template.map(str::to_string),
            separator: None,
        }
    }

    fn id_rule(pattern: &str, template: Option<&str>) -> IdTransform {
        IdTransform {
            source_pattern: pattern.to_string(),
            target_template: template.map(str::to_string),
        }
    }

    fn make_resource(id: &str, original_name: &str) -> Resource {
        let mut props = PropertyMap::new();
        props.insert(ORIGINAL_NAME_KEY.to_string(), original_name.into());
        Resource::new(id).with_properties(props)
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = TransformChain::new(&TransformSettings::default()).unwrap();
        assert!(chain.is_empty());

        let resource = make_resource("a", "a in m");
        assert_eq!(chain.transform(&resource), resource);
    }

    #[test]
    fn test_invalid_patterns_are_config_errors() {
        let settings = TransformSettings {
            id_transforms: Some(vec![id_rule("(.*)", None), id_rule("(", None)]),
            ..Default::default()
        };
        let err = TransformChain::new(&settings).unwrap_err();
        assert!(matches!(
            err,
            RuleError::InvalidPattern {
                kind: RuleKind::Id,
                index: 1,
                ..
            }
        ));

        let settings = TransformSettings {
            property_transforms: Some(vec![property_rule("[a-", None, None)]),
            ..Default::default()
        };
        assert!(matches!(
            TransformChain::new(&settings),
            Err(RuleError::InvalidPattern {
                kind: RuleKind::Property,
                index: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_source_path_is_config_error() {
        let mut rule = property_rule("(.*)", None, None);
        rule.source_path = String::new();
        let settings = TransformSettings {
            property_transforms: Some(vec![rule]),
            ..Default::default()
        };
        assert!(matches!(
            TransformChain::new(&settings),
            Err(RuleError::MissingSourcePath { index: 0 })
        ));
    }

    #[test]
    fn test_property_phase_runs_before_id_phase() {
        let settings = TransformSettings {
            property_transforms: Some(vec![
                property_rule(r"(.*)\sin .*", None, None),
                property_rule(r"^.*in\s(.*)", Some(UNIT_KEY), None),
            ]),
            id_transforms: Some(vec![id_rule("(.*)_avg", Some("$1_mean"))]),
            ..Default::default()
        };
        let chain = TransformChain::new(&settings).unwrap();
        let resource = make_resource("v1", "v_horz_100m_blue_avg in m/s");

        let out = chain.apply(&resource);
        assert_eq!(out.resource.id, "v_horz_100m_blue_mean");
        assert_eq!(out.applied, 3);
        assert_eq!(out.skipped, 0);

        let props = out.resource.properties.unwrap();
        assert_eq!(value::get_string(&props, &[UNIT_KEY]), Some("m/s"));
        assert_eq!(resource.properties.unwrap().len(), 1);
    }

    #[test]
    fn test_rules_see_earlier_writes() {
        let mut groups = property_rule(".*", Some(GROUPS_KEY), Some("$0"));
        groups.source_path = UNIT_KEY.to_string();
        let settings = TransformSettings {
            property_transforms: Some(vec![
                property_rule(r"^.*in\s(.*)", Some(UNIT_KEY), None),
                groups,
            ]),
            ..Default::default()
        };
        let chain = TransformChain::new(&settings).unwrap();
        let out = chain.transform(&make_resource("r", "speed in km/h"));

        let props = out.properties.unwrap();
        assert_eq!(value::get_string(&props, &[GROUPS_KEY]), Some("km/h"));
    }

    #[test]
    fn test_variables_resolve_against_original_properties() {
        let overwrite = property_rule("^.*", Some(UNIT_KEY), Some("changed"));
        let mut copy = property_rule("^.*", Some("label"), Some("${unit}"));
        copy.source_path = ORIGINAL_NAME_KEY.to_string();
        let settings = TransformSettings {
            property_transforms: Some(vec![overwrite, copy]),
            ..Default::default()
        };
        let chain = TransformChain::new(&settings).unwrap();

        let mut resource = make_resource("r", "x");
        if let Some(props) = resource.properties.as_mut() {
            props.insert(UNIT_KEY.to_string(), "m/s".into());
        }

        let props = chain.transform(&resource).properties.unwrap();
        assert_eq!(value::get_string(&props, &[UNIT_KEY]), Some("changed"));
        assert_eq!(value::get_string(&props, &["label"]), Some("m/s"));
    }

    #[test]
    fn test_id_phase_commits_even_without_match() {
        let settings = TransformSettings {
            id_transforms: Some(vec![id_rule("^zzz(.*)", None), id_rule("^yyy(.*)", None)]),
            ..Default::default()
        };
        let chain = TransformChain::new(&settings).unwrap();
        let out = chain.apply(&Resource::new("abc"));

        assert_eq!(out.resource.id, "abc");
        assert_eq!(out.applied, 0);
        assert_eq!(out.skipped, 2);
    }

    #[test]
    fn test_source_paths_are_cached_once() {
        let settings = TransformSettings {
            property_transforms: Some(vec![
                property_rule(r"^.*in\s(.*)", Some(UNIT_KEY), None),
                property_rule(r"(.*)\sin .*", None, None),
            ]),
            ..Default::default()
        };
        let chain = TransformChain::new(&settings).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.paths().len(), 1);
    }

    #[test]
    fn test_resource_without_properties() {
        let settings = TransformSettings {
            property_transforms: Some(vec![property_rule("(.*)", Some(UNIT_KEY), None)]),
            ..Default::default()
        };
        let chain = TransformChain::new(&settings).unwrap();
        let out = chain.transform(&Resource::new("bare"));

        assert_eq!(out, Resource::new("bare"));
    }
}
