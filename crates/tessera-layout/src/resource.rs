//! Shared resource tables.
//!
//! Strings, colors, dimensions, styles, arrays, drawables and images
//! referenced from templates. Values are deduplicated: adding an existing
//! value returns the name it was first stored under.

use indexmap::IndexMap;
use tessera_common::color::{Rgba, color_name};

/// A named style: a parent plus item overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleResource {
    /// Parent style name.
    pub parent: Option<String>,
    /// `item name → value`.
    pub items: IndexMap<String, String>,
}

/// Key-value store for generated resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    strings: IndexMap<String, String>,
    colors: IndexMap<String, String>,
    dimens: IndexMap<String, String>,
    styles: IndexMap<String, StyleResource>,
    arrays: IndexMap<String, Vec<String>>,
    drawables: IndexMap<String, String>,
    images: IndexMap<String, String>,
}

/// Lowercase identifier derived from arbitrary text, at most 32 characters.
#[must_use]
pub fn resource_name(hint: &str, fallback: &str) -> String {
    let mut name = String::new();
    let mut underscore = false;
    for c in hint.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
            underscore = false;
        } else if !underscore && !name.is_empty() {
            name.push('_');
            underscore = true;
        }
        if name.len() >= 32 {
            break;
        }
    }
    let name = name.trim_end_matches('_');
    if name.is_empty() {
        fallback.to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{fallback}_{name}")
    } else {
        name.to_string()
    }
}

fn unique_name<V>(table: &IndexMap<String, V>, base: &str) -> String {
    if !table.contains_key(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !table.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn add_deduplicated(table: &mut IndexMap<String, String>, value: &str, base: &str) -> String {
    if let Some((name, _)) = table.iter().find(|(_, v)| *v == value) {
        return name.clone();
    }
    let name = unique_name(table, base);
    let _ = table.insert(name.clone(), value.to_string());
    name
}

impl ResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string, named after its content unless `name` is given.
    pub fn add_string(&mut self, value: &str, name: Option<&str>) -> String {
        let base = resource_name(name.unwrap_or(value), "string");
        add_deduplicated(&mut self.strings, value, &base)
    }

    /// Adds a color, named after a keyword when it matches one.
    pub fn add_color(&mut self, color: &Rgba) -> String {
        let hex = color.to_hex();
        let base = color_name(color).map_or_else(
            || format!("color_{}", hex.trim_start_matches('#').to_ascii_lowercase()),
            str::to_string,
        );
        add_deduplicated(&mut self.colors, &hex, &base)
    }

    /// Adds a dimension such as `16dp`.
    pub fn add_dimen(&mut self, name: &str, value: &str) -> String {
        let base = resource_name(name, "dimen");
        if self.dimens.get(&base).is_some_and(|v| v == value) {
            return base;
        }
        let name = unique_name(&self.dimens, &base);
        let _ = self.dimens.insert(name.clone(), value.to_string());
        name
    }

    /// Adds a style, reusing an identical existing one.
    pub fn add_style(&mut self, name: &str, style: StyleResource) -> String {
        if let Some((existing, _)) = self.styles.iter().find(|(_, s)| **s == style) {
            return existing.clone();
        }
        let name = unique_name(&self.styles, name);
        let _ = self.styles.insert(name.clone(), style);
        name
    }

    /// Adds a string array.
    pub fn add_array(&mut self, name: &str, items: Vec<String>) -> String {
        if let Some((existing, _)) = self.arrays.iter().find(|(_, a)| **a == items) {
            return existing.clone();
        }
        let name = unique_name(&self.arrays, &resource_name(name, "array"));
        let _ = self.arrays.insert(name.clone(), items);
        name
    }

    /// Adds a drawable document, reusing an identical existing one.
    pub fn add_drawable(&mut self, name: &str, content: &str) -> String {
        let base = resource_name(name, "drawable");
        add_deduplicated(&mut self.drawables, content, &base)
    }

    /// Registers an image URI and returns its drawable name.
    pub fn add_image(&mut self, uri: &str) -> String {
        if let Some(name) = self.images.get(uri) {
            return name.clone();
        }
        let file = uri
            .rsplit('/')
            .next()
            .unwrap_or(uri)
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
        let base = resource_name(stem, "image");
        let taken = |candidate: &str| self.images.values().any(|v| v == candidate);
        let name = if taken(&base) {
            (1..)
                .map(|n| format!("{base}_{n}"))
                .find(|c| !taken(c))
                .unwrap_or(base)
        } else {
            base
        };
        let _ = self.images.insert(uri.to_string(), name.clone());
        name
    }

    /// String value by name.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.strings.get(name).map(String::as_str)
    }

    /// Color value by name.
    #[must_use]
    pub fn color(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    /// Dimension value by name.
    #[must_use]
    pub fn dimen(&self, name: &str) -> Option<&str> {
        self.dimens.get(name).map(String::as_str)
    }

    /// All strings.
    #[must_use]
    pub fn strings(&self) -> &IndexMap<String, String> {
        &self.strings
    }

    /// All colors.
    #[must_use]
    pub fn colors(&self) -> &IndexMap<String, String> {
        &self.colors
    }

    /// All dimensions.
    #[must_use]
    pub fn dimens(&self) -> &IndexMap<String, String> {
        &self.dimens
    }

    /// All styles.
    #[must_use]
    pub fn styles(&self) -> &IndexMap<String, StyleResource> {
        &self.styles
    }

    /// All arrays.
    #[must_use]
    pub fn arrays(&self) -> &IndexMap<String, Vec<String>> {
        &self.arrays
    }

    /// All drawables.
    #[must_use]
    pub fn drawables(&self) -> &IndexMap<String, String> {
        &self.drawables
    }

    /// All images, `uri → name`.
    #[must_use]
    pub fn images(&self) -> &IndexMap<String, String> {
        &self.images
    }

    /// Empties every table.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_deduplicate_by_value() {
        let mut store = ResourceStore::new();
        let a = store.add_string("Sign in", None);
        let b = store.add_string("Sign in", Some("other"));
        assert_eq!(a, "sign_in");
        assert_eq!(a, b);
        assert_eq!(store.strings().len(), 1);
    }

    #[test]
    fn test_string_name_collision_gets_suffix() {
        let mut store = ResourceStore::new();
        let _ = store.add_string("Hello!", None);
        let second = store.add_string("Hello?", None);
        assert_eq!(second, "hello_1");
    }

    #[test]
    fn test_colors_named_by_keyword() {
        let mut store = ResourceStore::new();
        assert_eq!(store.add_color(&Rgba::opaque(255, 255, 255)), "white");
        assert_eq!(store.add_color(&Rgba::opaque(18, 52, 86)), "color_123456");
        assert_eq!(store.color("white"), Some("#FFFFFF"));
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(resource_name("  Hello, World  ", "string"), "hello_world");
        assert_eq!(resource_name("42 items", "string"), "string_42_items");
        assert_eq!(resource_name("!!!", "string"), "string");
    }

    #[test]
    fn test_images_named_by_file() {
        let mut store = ResourceStore::new();
        assert_eq!(store.add_image("https://a.com/img/Logo.png?v=2"), "logo");
        assert_eq!(store.add_image("https://b.com/logo.jpg"), "logo_1");
        assert_eq!(store.add_image("https://a.com/img/Logo.png?v=2"), "logo");
    }
}
