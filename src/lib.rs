//! Catalog metadata transformation engine.
//!
//! Derives resource identifiers and property values from existing metadata
//! using ordered, regex-based rewrite rules:
//!
//! - Property rules read a string at a slash-delimited path, rewrite it with
//!   a regex and a back-reference template, and store the result as a
//!   property (scalar or split into an array) or as the new identifier
//! - `${path}` variables in property templates resolve against the resource's
//!   properties as they were before any rule ran
//! - Identifier rules then rewrite the identifier in sequence
//!
//! ## Configuration Example
//!
//! ```yaml
//! propertyTransforms:
//!   - sourcePath: "original-name"
//!     sourcePattern: '^.*in\s(.*)'
//!     targetProperty: "unit"
//!   - operation: SetIfNotExists
//!     sourcePath: "original-name"
//!     sourcePattern: '.*?([0-9]+m)_(.*)_(.*)'
//!     targetProperty: "groups"
//!     targetTemplate: "$2 ($1);$2 ($3)"
//!     separator: ";"
//! idTransforms:
//!   - sourcePattern: '(.*)_very_long_name(.*)'
//!     targetTemplate: "$1_VLN$2"
//! ```

pub mod catalog;
pub mod config;
pub mod context;
pub mod enricher;
pub mod path;
pub mod pattern;
pub mod rule;
pub mod transformer;
pub mod value;

pub use catalog::{Catalog, Resource};
pub use config::{IdTransform, PropertyTransform, TransformOperation, TransformSettings};
pub use context::TransformContext;
pub use enricher::{CatalogEnricher, CatalogHandler, EnricherError, EnricherStats};
pub use rule::{RuleError, TransformChain};
pub use value::{PropertyMap, PropertyValue};
