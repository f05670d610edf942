//! Slash-delimited property paths and their segment cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Path segment separator.
pub const SEPARATOR: char = '/';

/// Memoized path splitting.
///
/// Every distinct path string is split once for the lifetime of the cache.
/// Rules share their configuration across all resources of a catalog, so the
/// same handful of paths is resolved over and over.
#[derive(Debug, Default)]
pub struct PathCache {
    segments: RwLock<HashMap<String, Arc<[String]>>>,
}

impl PathCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a path into its ordered segments.
    ///
    /// Empty or malformed paths yield degenerate segments; lookups with them
    /// simply find nothing.
    pub fn resolve(&self, path: &str) -> Arc<[String]> {
        if let Ok(cache) = self.segments.read() {
            if let Some(segments) = cache.get(path) {
                return Arc::clone(segments);
            }
        }

        let segments: Arc<[String]> = split(path).into();

        // A poisoned lock only costs us the memoization.
        if let Ok(mut cache) = self.segments.write() {
            cache
                .entry(path.to_string())
                .or_insert_with(|| Arc::clone(&segments));
        }

        segments
    }

    /// Number of distinct paths cached so far.
    pub fn len(&self) -> usize {
        self.segments.read().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a path without caching.
pub fn split(path: &str) -> Vec<String> {
    path.split(SEPARATOR).map(str::to_string).collect()
}
