//! Identifier and property transformers.

mod id;
mod property;

pub use id::IdTransformer;
pub use property::PropertyTransformer;

use crate::context::TransformContext;
use crate::value::PropertyMap;
use std::borrow::Cow;
use std::fmt;

/// Trait for a single rewrite rule applied to one resource.
pub trait Transformer: Send + Sync {
    /// Apply the rule to the evolving resource state.
    fn transform(&self, state: &mut ResourceState<'_>, ctx: &TransformContext<'_>)
        -> TransformOutcome;

    /// Get the transformer name for debugging.
    fn name(&self) -> &'static str;
}

/// Evolving state of a resource while its rule chain runs.
///
/// Properties stay borrowed from the input until the first write.
#[derive(Debug, Clone)]
pub struct ResourceState<'a> {
    /// Current identifier
    pub id: String,
    /// Current properties
    properties: Cow<'a, PropertyMap>,
}

impl<'a> ResourceState<'a> {
    /// Start from a resource's identifier and properties.
    pub fn new(id: impl Into<String>, properties: &'a PropertyMap) -> Self {
        Self {
            id: id.into(),
            properties: Cow::Borrowed(properties),
        }
    }

    /// Current properties.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Properties for writing, copied from the input on first use.
    pub fn properties_mut(&mut self) -> &mut PropertyMap {
        self.properties.to_mut()
    }

    /// Whether any rule has written a property.
    pub fn is_modified(&self) -> bool {
        matches!(self.properties, Cow::Owned(_))
    }

    /// The written property map, if any rule wrote one.
    pub fn into_modified(self) -> Option<PropertyMap> {
        match self.properties {
            Cow::Owned(map) => Some(map),
            Cow::Borrowed(_) => None,
        }
    }
}

/// Result of applying one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOutcome {
    /// The rule wrote its target
    Applied,
    /// The rule left the resource untouched
    Skipped(SkipReason),
}

impl TransformOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Why a rule did not apply. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No string value at the source path
    SourceNotFound,
    /// Target already set and the rule only fills gaps
    TargetExists,
    /// Source pattern did not match
    NoMatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::SourceNotFound => "source not found",
            Self::TargetExists => "target already set",
            Self::NoMatch => "pattern did not match",
        };
        f.write_str(reason)
    }
}
