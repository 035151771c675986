use chartdoc_document::StarterConfig;
use chartdoc_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "chartdoc.config.json";

/// Chartdoc configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Chart document used when a command is given no file
    #[serde(default = "default_document")]
    pub document: String,

    /// Editing behavior: history depth, recordable actions, matrix defaults
    #[serde(default)]
    pub editor: EditorConfig,

    /// Parameters of the document written by `chartdoc init`
    #[serde(default)]
    pub starter: StarterConfig,
}

fn default_document() -> String {
    "chart.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.editor.validate()?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Document path: the explicit one if given, else the configured default
    pub fn document_path(&self, cwd: &str, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => PathBuf::from(cwd).join(path),
            None => PathBuf::from(cwd).join(&self.document),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: default_document(),
            editor: EditorConfig::default(),
            starter: StarterConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "document": "dashboard.json",
            "editor": { "historyLimit": 5, "defaultMatrixSize": 4 },
            "starter": { "minutes": 60 }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.document, "dashboard.json");
        assert_eq!(config.editor.history_limit, 5);
        assert_eq!(config.editor.default_matrix_size, 4);
        assert!(config.editor.is_recordable("addElement"));
        assert_eq!(config.starter.minutes, 60);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.document, "chart.json");
        assert_eq!(config.editor, EditorConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_editor_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "editor": { "defaultMatrixSize": 0 } }"#,
        )
        .unwrap();

        assert!(Config::load(&dir.path().display().to_string()).is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config, Config::default());
    }
}
