use retouch_patcher::PatchOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "retouch.config.json";

/// Retouch configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory names skipped in addition to the built-in ones
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Template file extensions (replaces the defaults)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    /// Name of the conditional style helper used in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_helper: Option<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn patch_options(&self) -> PatchOptions {
        let mut options = PatchOptions::default();
        for dir in &self.exclude {
            if !options.exclude.contains(dir) {
                options.exclude.push(dir.clone());
            }
        }
        if let Some(extensions) = &self.extensions {
            options.extensions = extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect();
        }
        if let Some(helper) = &self.style_helper {
            options.style_helper = helper.clone();
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "exclude": ["coverage", "dist"],
            "extensions": [".tsx", "mdx"],
            "styleHelper": "inlineStyle"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        let options = config.patch_options();

        assert!(options.exclude.contains(&"coverage".to_string()));
        assert!(options.exclude.contains(&"node_modules".to_string()));
        assert_eq!(
            options.exclude.iter().filter(|d| *d == "dist").count(),
            1
        );
        assert_eq!(options.extensions, vec!["tsx", "mdx"]);
        assert_eq!(options.style_helper, "inlineStyle");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.patch_options(), PatchOptions::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.exclude.is_empty());
        assert!(config.style_helper.is_none());
    }
}
