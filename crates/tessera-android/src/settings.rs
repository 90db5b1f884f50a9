//! Target settings.
//!
//! Read-only for the whole run. Extensions branch on the API gates; the
//! controller and writer use the density, namespaces and formatting options.

use serde::{Deserialize, Serialize};
use tessera_common::units::format_decimal;

/// First API level with `Start`/`End` layout attributes.
pub const API_RTL: u32 = 17;
/// First API level with `layout_marginHorizontal` and `justificationMode`.
pub const API_OREO: u32 = 26;
/// First API level with `android:lineHeight`.
pub const API_LINE_HEIGHT: u32 = 28;

/// Density that maps one CSS pixel to one dp.
const BASELINE_DPI: f32 = 160.0;

/// XML namespace URIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespaces {
    /// `xmlns:android`
    pub android: String,
    /// `xmlns:app`
    pub app: String,
    /// `xmlns:tools`
    pub tools: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            android: "http://schemas.android.com/apk/res/android".to_string(),
            app: "http://schemas.android.com/apk/res-auto".to_string(),
            tools: "http://schemas.android.com/tools".to_string(),
        }
    }
}

/// Settings for the Android target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AndroidSettings {
    /// API level the output is compiled against.
    pub target_api: u32,
    /// Lowest API level the output must run on.
    pub min_api: u32,
    /// Screen density the source pixels were measured at.
    pub resolution_dpi: f32,
    /// Name of the main layout file, without extension.
    pub main_layout: String,
    /// Screen width in dp.
    pub screen_width: f32,
    /// Screen height in dp.
    pub screen_height: f32,
    /// Spaces per indentation level in generated XML.
    pub indent: usize,
    /// Emit margins and padding as `@dimen` references.
    pub dimension_resources: bool,
    /// Namespace URIs written on root elements.
    pub namespaces: Namespaces,
}

impl Default for AndroidSettings {
    fn default() -> Self {
        Self {
            target_api: 34,
            min_api: 21,
            resolution_dpi: BASELINE_DPI,
            main_layout: "activity_main".to_string(),
            screen_width: 1280.0,
            screen_height: 900.0,
            indent: 4,
            dimension_resources: false,
            namespaces: Namespaces::default(),
        }
    }
}

impl AndroidSettings {
    /// Whether every supported device has `api`.
    #[must_use]
    pub fn supports(&self, api: u32) -> bool {
        self.min_api >= api
    }

    /// Converts CSS pixels to dp.
    #[must_use]
    pub fn to_dp(&self, px: f32) -> f32 {
        if self.resolution_dpi > 0.0 {
            px * BASELINE_DPI / self.resolution_dpi
        } else {
            px
        }
    }

    /// `px` as a dp dimension string.
    #[must_use]
    pub fn dp(&self, px: f32) -> String {
        format!("{}dp", format_decimal(self.to_dp(px), 2))
    }

    /// `px` as an sp dimension string.
    #[must_use]
    pub fn sp(&self, px: f32) -> String {
        format!("{}sp", format_decimal(self.to_dp(px), 2))
    }
}
