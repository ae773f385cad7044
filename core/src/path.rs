//! Field paths
//!
//! A [`FieldPath`] is the chain of property names locating a node. The editor
//! uses it to address the object a change applies to; the compiled ruleset and
//! the form state use its dot-joined form (`address.street`) as the field key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Create a root path (empty)
    pub fn root() -> Self {
        Self { segments: vec![] }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments; also the nesting depth of the node it points at
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path of a child property
    pub fn push(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.segments.push(name.to_string());
        new
    }

    /// Append a key that may itself be dot-joined
    pub fn join(&self, key: &str) -> Self {
        self.segments().chain(key.split('.').filter(|seg| !seg.is_empty())).collect()
    }

    /// Last segment, the name of the node itself
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path without its last segment
    pub fn parent(&self) -> Self {
        let mut new = self.clone();
        new.segments.pop();
        new
    }

    /// First segment and the remaining path below it
    pub fn split_first(&self) -> Option<(&str, FieldPath)> {
        let (head, rest) = self.segments.split_first()?;
        Some((head.as_str(), FieldPath { segments: rest.to_vec() }))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// True when `self` lies strictly below `ancestor`
    pub fn is_under(&self, ancestor: &FieldPath) -> bool {
        self.segments.len() > ancestor.segments.len() && self.segments.starts_with(&ancestor.segments)
    }

    /// Parse a dot-joined key. Empty segments are skipped.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s
                .split('.')
                .filter(|seg| !seg.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
