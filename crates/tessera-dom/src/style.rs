//! Property name to value maps for computed and declared style.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A computed-style view: CSS property names mapped to their resolved values.
///
/// Property names are stored in their hyphenated form (`margin-top`). Lookups
/// accept camel case too (`marginTop`) since authors and snapshot tools use
/// both spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(HashMap<String, String>);

impl StyleMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `property`, or `None` when absent or empty.
    pub fn get(&self, property: &str) -> Option<&str> {
        let value = match self.0.get(property) {
            Some(value) => Some(value),
            None if property.bytes().any(|b| b.is_ascii_uppercase()) => {
                self.0.get(&hyphenate(property))
            }
            None => None,
        };
        value.map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Value for `property`, or the empty string.
    pub fn value(&self, property: &str) -> &str {
        self.get(property).unwrap_or_default()
    }

    /// Whether `property` has a non-empty value.
    pub fn has(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    /// Sets a property, normalising camel case names.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let key = if property.bytes().any(|b| b.is_ascii_uppercase()) {
            hyphenate(property)
        } else {
            property.to_string()
        };
        let _ = self.0.insert(key, value.into());
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no properties are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(property, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (k, v) in iter {
            map.set(&k.into(), v);
        }
        map
    }
}

fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
