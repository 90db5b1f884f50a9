//! Target settings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::mime;

/// Settings for the chrome target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeSettings {
    /// File name of the re-serialised document.
    pub index_filename: String,
    /// Directory that receives assets without a host.
    pub local_directory: String,
    /// Compression formats by mime pattern, e.g. `"image/*" = ["webp"]`.
    pub compress: IndexMap<String, Vec<String>>,
    /// Transform commands by mime pattern, e.g. `"image/png" = ["resize(800)"]`.
    pub commands: IndexMap<String, Vec<String>>,
    /// Keep `<script>` sources in the bundle.
    pub include_scripts: bool,
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            index_filename: "index.html".to_string(),
            local_directory: "assets".to_string(),
            compress: IndexMap::new(),
            commands: IndexMap::new(),
            include_scripts: true,
        }
    }
}

impl ChromeSettings {
    /// Compression formats for an asset of type `mime_type`, without duplicates.
    #[must_use]
    pub fn compression_for(&self, mime_type: &str) -> Vec<String> {
        collect(&self.compress, mime_type)
    }

    /// Transform commands for an asset of type `mime_type`, in declaration order.
    #[must_use]
    pub fn commands_for(&self, mime_type: &str) -> Vec<String> {
        collect(&self.commands, mime_type)
    }
}

fn collect(rules: &IndexMap<String, Vec<String>>, mime_type: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for (pattern, values) in rules {
        if !mime::matches(pattern, mime_type) {
            continue;
        }
        for value in values {
            if !found.contains(value) {
                found.push(value.clone());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_merge_by_pattern() {
        let mut settings = ChromeSettings::default();
        let _ = settings.compress.insert("image/*".into(), vec!["webp".into(), "gz".into()]);
        let _ = settings.compress.insert("*".into(), vec!["gz".into(), "br".into()]);
        assert_eq!(settings.compression_for("image/png"), vec!["webp", "gz", "br"]);
        assert_eq!(settings.compression_for("text/css"), vec!["gz", "br"]);
        assert!(settings.commands_for("image/png").is_empty());
    }
}
