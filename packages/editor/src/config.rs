use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Output encoding for a materialized letter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

/// Tunables for one composition engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Maximum snapshots kept on the undo stack
    pub history_capacity: usize,

    /// Quiet period before a free-text edit becomes an undo point
    pub debounce_ms: u64,

    pub currency_symbol: String,

    pub checkout_base_url: String,

    /// Mixed into derived passcodes
    pub passcode_seed: String,

    pub output_format: OutputFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            debounce_ms: 300,
            currency_symbol: "£".to_string(),
            checkout_base_url: "https://pay.example/checkout".to_string(),
            passcode_seed: "pitchcraft".to_string(),
            output_format: OutputFormat::Text,
        }
    }
}

impl EngineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
