//! Property rewriting transformer.

use super::{ResourceState, SkipReason, TransformOutcome, Transformer};
use crate::config::{PropertyTransform, TransformOperation};
use crate::context::{self, TransformContext};
use crate::path::PathCache;
use crate::pattern::{Pattern, Template, DEFAULT_TEMPLATE};
use crate::value::{self, Lookup, PropertyValue};
use std::sync::Arc;

/// Replacement template, parsed up front unless it needs per-resource
/// variable expansion.
#[derive(Debug, Clone)]
enum RuleTemplate {
    /// Fully known at construction
    Static(Template),
    /// Holds `${path}` variables, parsed after interpolation
    Variables(String),
}

/// Property rewriting transformer.
#[derive(Debug, Clone)]
pub struct PropertyTransformer {
    operation: TransformOperation,
    /// Pre-split source path
    source_segments: Arc<[String]>,
    /// Pattern matched against the source value
    pattern: Pattern,
    /// Property to write; the identifier when `None`
    target_property: Option<String>,
    template: RuleTemplate,
    /// Split the result into an array on this delimiter
    separator: Option<String>,
}

impl PropertyTransformer {
    /// Create a new property transformer from configuration.
    pub fn new(config: &PropertyTransform, paths: &PathCache) -> Result<Self, regex::Error> {
        let pattern = Pattern::new(&config.source_pattern)?;

        let template = match config.target_template.as_deref() {
            None => RuleTemplate::Static(pattern.template(DEFAULT_TEMPLATE)),
            Some(t) if context::has_variables(t) => RuleTemplate::Variables(t.to_string()),
            Some(t) => RuleTemplate::Static(pattern.template(t)),
        };

        Ok(Self {
            operation: config.operation,
            source_segments: paths.resolve(&config.source_path),
            pattern,
            target_property: config.target_property.clone(),
            template,
            separator: config.separator.clone(),
        })
    }

    fn target_is_set(&self, state: &ResourceState<'_>) -> bool {
        match &self.target_property {
            Some(key) => matches!(
                value::lookup(state.properties(), &[key.as_str()]),
                Lookup::Present(_)
            ),
            None => false,
        }
    }

    fn rewrite(&self, source: &str, ctx: &TransformContext<'_>) -> String {
        match &self.template {
            RuleTemplate::Static(template) => self.pattern.replace_all(source, template),
            RuleTemplate::Variables(raw) => {
                let expanded = ctx.interpolate_template(raw);
                self.pattern.substitute(source, &expanded)
            }
        }
    }
}

impl Transformer for PropertyTransformer {
    fn transform(
        &self,
        state: &mut ResourceState<'_>,
        ctx: &TransformContext<'_>,
    ) -> TransformOutcome {
        let Some(source) = value::get_string(state.properties(), &self.source_segments[..])
        else {
            return TransformOutcome::Skipped(SkipReason::SourceNotFound);
        };

        if self.operation == TransformOperation::SetIfNotExists && self.target_is_set(state) {
            return TransformOutcome::Skipped(SkipReason::TargetExists);
        }

        if !self.pattern.matches(source) {
            return TransformOutcome::Skipped(SkipReason::NoMatch);
        }

        let result = self.rewrite(source, ctx);

        match (&self.target_property, &self.separator) {
            (None, _) => state.id = result,
            (Some(key), None) => value::set_value(state.properties_mut(), key, result),
            (Some(key), Some(separator)) => {
                value::set_value(state.properties_mut(), key, split(&result, separator))
            }
        }

        TransformOutcome::Applied
    }

    fn name(&self) -> &'static str {
        "property_transformer"
    }
}

/// Split on a delimiter; an empty delimiter keeps the value whole.
fn split(value: &str, separator: &str) -> PropertyValue {
    if separator.is_empty() {
        return PropertyValue::StringArray(vec![value.to_string()]);
    }
    PropertyValue::StringArray(value.split(separator).map(str::to_string).collect())
}
