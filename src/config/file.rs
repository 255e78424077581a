//! File-based configuration loading
//!
//! Loads an optional upstream model profile from a JSON file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Configuration loaded from JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Upstream overrides (all fields optional)
    #[serde(default)]
    pub upstream: Option<FileUpstreamConfig>,
}

/// Upstream model profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileUpstreamConfig {
    #[serde(rename = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<FileGenerationConfig>,
}

/// Generation parameters, named as the upstream API names them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl FileConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: FileConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config JSON")?;

        config.validate()?;

        debug!("Upstream profile present: {}", config.upstream.is_some());
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. `LINGUIX_CONFIG` environment variable
    /// 2. ~/.config/linguix/linguix.json
    /// 3. ./linguix.json
    ///
    /// Unlike the environment settings, the file is optional.
    pub fn load_default() -> Result<Option<Self>> {
        if let Ok(explicit) = std::env::var("LINGUIX_CONFIG") {
            return Self::load(Path::new(&explicit)).map(Some);
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("linguix").join("linguix.json");
            if config_path.exists() {
                return Self::load(&config_path).map(Some);
            }
        }

        let local_path = Path::new("linguix.json");
        if local_path.exists() {
            return Self::load(local_path).map(Some);
        }

        Ok(None)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let Some(upstream) = &self.upstream else {
            return Ok(());
        };

        if let Some(base_url) = &upstream.base_url {
            if !base_url.starts_with("http") {
                anyhow::bail!("Invalid upstream base URL in config file: {}", base_url);
            }
        }

        if let Some(model) = &upstream.model {
            if model.is_empty() {
                anyhow::bail!("Upstream model in config file cannot be empty");
            }
        }

        if upstream.timeout == Some(0) {
            anyhow::bail!("Upstream timeout in config file cannot be 0");
        }

        Ok(())
    }
}
