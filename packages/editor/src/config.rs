use crate::errors::EditorError;
use chartdoc_document::Fields;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Action names that take a history snapshot before they run
pub const DEFAULT_RECORDABLE_ACTIONS: [&str; 11] = [
    "addElement",
    "removeElement",
    "reparentElement",
    "toggleVisibility",
    "updateProperty",
    "updateProperties",
    "insertMatrixLine",
    "deleteMatrixLine",
    "mergeCells",
    "unmergeCells",
    "setDataSource",
];

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo levels kept before the oldest is evicted (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Allow-list of actions that are recorded in history
    #[serde(default = "default_recordable_actions")]
    pub recordable_actions: Vec<String>,

    /// Column/row count assumed when the matrix has no label arrays
    #[serde(default = "default_matrix_size")]
    pub default_matrix_size: usize,

    /// Style stamped onto new merge regions
    #[serde(default = "default_merge_item_style")]
    pub merge_item_style: Fields,
}

fn default_history_limit() -> usize {
    50
}

fn default_recordable_actions() -> Vec<String> {
    DEFAULT_RECORDABLE_ACTIONS
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn default_matrix_size() -> usize {
    5
}

fn default_merge_item_style() -> Fields {
    match json!({
        "color": "rgba(255, 255, 255, 0.05)",
        "borderWidth": 1,
        "borderColor": "#444"
    }) {
        serde_json::Value::Object(style) => style,
        _ => Fields::new(),
    }
}

impl EditorConfig {
    /// Parse a config from JSON; missing keys take their defaults
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        let config: EditorConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        if self.default_matrix_size == 0 {
            return Err(EditorError::Config(
                "defaultMatrixSize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_recordable(&self, action: &str) -> bool {
        self.recordable_actions.iter().any(|name| name == action)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            recordable_actions: default_recordable_actions(),
            default_matrix_size: default_matrix_size(),
            merge_item_style: default_merge_item_style(),
        }
    }
}
