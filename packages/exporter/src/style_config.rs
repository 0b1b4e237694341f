//! Design tokens rendered into `styles.css`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    pub font_family: String,
    pub heading_font_family: String,
    pub base_size: String,
    pub line_height: String,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "system-ui, -apple-system, \"Segoe UI\", sans-serif".to_string(),
            heading_font_family: "inherit".to_string(),
            base_size: "16px".to_string(),
            line_height: "1.6".to_string(),
        }
    }
}

/// Color palette, typography and spacing scale of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    pub colors: BTreeMap<String, String>,
    pub typography: Typography,
    pub spacing: BTreeMap<String, String>,
}

impl StyleConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        let colors = [
            ("primary", "#2563eb"),
            ("secondary", "#7c3aed"),
            ("accent", "#f59e0b"),
            ("background", "#ffffff"),
            ("text", "#111827"),
        ];
        let spacing = [
            ("xs", "4px"),
            ("sm", "8px"),
            ("md", "16px"),
            ("lg", "24px"),
            ("xl", "48px"),
        ];

        Self {
            colors: colors
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            typography: Typography::default(),
            spacing: spacing
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
