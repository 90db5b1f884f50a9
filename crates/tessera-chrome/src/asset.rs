//! Bundle entries.

use serde::{Deserialize, Serialize};

/// One file of the bundle.
///
/// Exactly one of `content` and `uri` is set: generated files carry their
/// content, referenced files the absolute location to fetch them from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Directory inside the bundle, `/`-separated, empty for the root.
    pub pathname: String,
    /// File name.
    pub filename: String,
    /// Mime type.
    pub mime_type: String,
    /// Generated content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Source location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Compression formats to produce alongside the file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compress: Vec<String>,
    /// Transform commands to run on the file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl Asset {
    /// Path of the file inside the bundle.
    #[must_use]
    pub fn path(&self) -> String {
        if self.pathname.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.pathname, self.filename)
        }
    }
}

/// The document and every file it references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// The re-serialised document first, then referenced files in document
    /// order.
    pub assets: Vec<Asset>,
}

impl Bundle {
    /// The re-serialised document.
    #[must_use]
    pub fn index(&self) -> Option<&Asset> {
        self.assets.first().filter(|asset| asset.content.is_some())
    }

    /// Referenced files still to be fetched.
    pub fn remote(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(|asset| asset.uri.is_some())
    }

    /// Asset list as pretty-printed JSON, content omitted.
    ///
    /// # Errors
    ///
    /// Serialisation failures from `serde_json`.
    pub fn manifest(&self) -> Result<String, serde_json::Error> {
        let listed: Vec<Asset> = self
            .assets
            .iter()
            .map(|asset| Asset {
                content: None,
                ..asset.clone()
            })
            .collect();
        serde_json::to_string_pretty(&listed)
    }
}
