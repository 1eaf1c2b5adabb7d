use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_file: Option<String>,
    pub port: Option<u16>,
    pub web_dir: Option<String>,
    pub logging_level: Option<String>,
    pub max_body_bytes: Option<usize>,

    pub search: Option<SearchFileConfig>,
}

/// `[search]` section, the external catalog settings.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SearchFileConfig {
    pub base_url: Option<String>,
    pub covers_base_url: Option<String>,
    pub timeout_sec: Option<u64>,
    pub limit: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
