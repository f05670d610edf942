//! Resource property values and tree access.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resource's property bag.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A JSON-like property value.
///
/// Serialized untagged so ordinary JSON documents map onto it directly.
/// Arrays made only of strings deserialize as [`PropertyValue::StringArray`];
/// anything else lands in [`PropertyValue::List`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    StringArray(Vec<String>),
    List(Vec<PropertyValue>),
    Map(PropertyMap),
}

impl PropertyValue {
    /// The textual scalar, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The string elements, if this is an array made only of strings.
    pub fn as_str_array(&self) -> Option<Vec<&str>> {
        match self {
            Self::StringArray(items) => Some(items.iter().map(String::as_str).collect()),
            Self::List(items) => items.iter().map(PropertyValue::as_str).collect(),
            _ => None,
        }
    }

    /// The nested map, if this is one.
    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringArray(value)
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        Self::Map(value)
    }
}

/// Outcome of walking a path through a property tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// Some segment along the path does not exist.
    Missing,
    /// The path exists and holds an explicit null.
    Null,
    /// The path exists and holds a value.
    Present(&'a PropertyValue),
}

/// Walk nested maps by successive segment keys.
pub fn lookup<'a, S: AsRef<str>>(map: &'a PropertyMap, segments: &[S]) -> Lookup<'a> {
    let Some((last, parents)) = segments.split_last() else {
        return Lookup::Missing;
    };

    let mut current = map;
    for segment in parents {
        match current.get(segment.as_ref()).and_then(PropertyValue::as_map) {
            Some(next) => current = next,
            None => return Lookup::Missing,
        }
    }

    match current.get(last.as_ref()) {
        None => Lookup::Missing,
        Some(PropertyValue::Null) => Lookup::Null,
        Some(value) => Lookup::Present(value),
    }
}

/// Read a string scalar at a path.
///
/// Returns `None` both when the path is absent and when the value there is
/// not a string; a missing property is routine, not an error.
pub fn get_string<'a, S: AsRef<str>>(map: &'a PropertyMap, segments: &[S]) -> Option<&'a str> {
    match lookup(map, segments) {
        Lookup::Present(value) => value.as_str(),
        _ => None,
    }
}

/// Read an array of strings at a path.
pub fn get_string_array<'a, S: AsRef<str>>(
    map: &'a PropertyMap,
    segments: &[S],
) -> Option<Vec<&'a str>> {
    match lookup(map, segments) {
        Lookup::Present(value) => value.as_str_array(),
        _ => None,
    }
}

/// Assign a top-level property, replacing any existing value of any type.
pub fn set_value(map: &mut PropertyMap, key: &str, value: impl Into<PropertyValue>) {
    map.insert(key.to_string(), value.into());
}
