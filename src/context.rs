//! Per-resource transform context for variable resolution and interpolation.

use crate::path::PathCache;
use crate::value::{self, PropertyMap};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching variable expressions like ${...}
///
/// `$$` is matched as its own alternative so an escaped dollar is consumed
/// before it can start a placeholder. Only group 1 marks a variable.
static VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\$|\{([^}]+)\})").unwrap());

/// Shared empty map for resources without properties.
static EMPTY: PropertyMap = PropertyMap::new();

/// Whether a template holds `${...}` placeholders that need interpolation.
pub fn has_variables(template: &str) -> bool {
    VAR_REGEX
        .captures_iter(template)
        .any(|caps| caps.get(1).is_some())
}

/// Context available while transforming one resource.
///
/// Variables always resolve against the resource's properties as they were
/// before any rule ran, never against the evolving copy.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Properties of the resource before the rule chain started
    original: &'a PropertyMap,
    /// Shared path segment cache
    paths: &'a PathCache,
}

impl<'a> TransformContext<'a> {
    /// Create a new transform context.
    pub fn new(original: Option<&'a PropertyMap>, paths: &'a PathCache) -> Self {
        Self {
            original: original.unwrap_or(&EMPTY),
            paths,
        }
    }

    /// The pre-chain property snapshot.
    pub fn original(&self) -> &'a PropertyMap {
        self.original
    }

    /// Resolve a slash-delimited property path to its string value.
    pub fn resolve(&self, path: &str) -> Option<&'a str> {
        let segments = self.paths.resolve(path);
        value::get_string(self.original, &segments[..])
    }

    /// Interpolate variables into a replacement template.
    ///
    /// Unresolvable variables expand to the empty string. Resolved values are
    /// escaped so any `$` they contain stays literal and back-references only
    /// ever come from the template itself. `$$` is left as is.
    pub fn interpolate_template(&self, template: &str) -> String {
        VAR_REGEX
            .replace_all(template, |caps: &regex::Captures| match caps.get(1) {
                Some(path) => self
                    .resolve(path.as_str())
                    .unwrap_or_default()
                    .replace('$', "$$"),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
