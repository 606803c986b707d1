use pitchcraft_editor::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pitchcraft.config.json";

/// Pitchcraft configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding `<variant>.json` catalogs
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,

    /// Directory drafts are saved to, one file per session
    #[serde(default = "default_draft_dir")]
    pub draft_dir: String,

    /// Catalog variant used when none is named
    #[serde(default = "default_variant")]
    pub default_variant: String,

    /// Engine tunables, inlined at the top level of the file
    #[serde(flatten)]
    pub engine: EngineConfig,
}

fn default_catalog_dir() -> String {
    "catalogs".to_string()
}

fn default_draft_dir() -> String {
    "drafts".to_string()
}

fn default_variant() -> String {
    "production".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn get_catalog_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.catalog_dir)
    }

    pub fn get_draft_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.draft_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            draft_dir: default_draft_dir(),
            default_variant: default_variant(),
            engine: EngineConfig::default(),
        }
    }
}
