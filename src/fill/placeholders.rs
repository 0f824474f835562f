//! Ordered placeholder maps and marker discovery.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MARKER_PATTERN: &str = r"\{\{[^{}\s]+\}\}";

/// An ordered mapping from marker text to replacement text.
///
/// Keys are applied in insertion order. Inserting an existing key replaces
/// its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a marker.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert a marker and return self.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get the replacement for a marker.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(marker, replacement)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over markers in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `NAME=value` assignment.
    ///
    /// A bare name is wrapped in double braces; a name that already carries
    /// them is used as-is. The value may be empty.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| Error::InvalidPlaceholder(assignment.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidPlaceholder(assignment.to_string()));
        }
        let key = if name.starts_with("{{") && name.ends_with("}}") {
            name.to_string()
        } else {
            format!("{{{{{}}}}}", name)
        };
        Ok((key, value.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Find every `{{NAME}}` marker in a text, in order of appearance, without
/// duplicates.
pub fn find_markers(text: &str) -> Vec<String> {
    let re = Regex::new(MARKER_PATTERN).unwrap();
    let mut found: Vec<String> = Vec::new();
    for m in re.find_iter(text) {
        if !found.iter().any(|f| f == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }
    found
}
