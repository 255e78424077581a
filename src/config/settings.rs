//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::file::FileConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Document store configuration
    pub store: StoreConfig,
    /// Generative-language upstream configuration
    pub upstream: UpstreamConfig,
    /// Verbatim pass-through proxy configuration
    pub passthrough: PassthroughConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection string
    pub uri: String,
    /// Database name
    pub database: String,
    /// Server selection timeout for the startup connection, in seconds
    pub connect_timeout: u64,
}

/// Generative-language upstream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API base URL, without the `/models/...` suffix
    pub base_url: String,
    /// Model identifier used in the request path
    pub model: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Sampling temperature sent in `generationConfig`
    pub temperature: f32,
    /// `maxOutputTokens` sent in `generationConfig`
    pub max_output_tokens: u32,
}

/// Pass-through proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassthroughConfig {
    /// Whether the `/api/*` catch-all is mounted
    pub enabled: bool,
    /// Host that receives forwarded requests
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size: 1024 * 1024,
            },
            store: StoreConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "Duolingo".to_string(),
                connect_timeout: 5,
            },
            upstream: UpstreamConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-2.0-flash".to_string(),
                timeout: 30,
                temperature: 0.7,
                max_output_tokens: 1024,
            },
            passthrough: PassthroughConfig {
                enabled: true,
                base_url: "https://api.x.ai".to_string(),
                timeout: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", &defaults.server.host),
                port: get_env_or_default("SERVER_PORT", &defaults.server.port.to_string())
                    .parse()
                    .context("Invalid port number")?,
                max_request_size: get_env_or_default(
                    "MAX_REQUEST_SIZE",
                    &defaults.server.max_request_size.to_string(),
                )
                .parse()
                .context("Invalid maximum request size")?,
            },
            store: StoreConfig {
                uri: get_env_or_default("MONGODB_URI", &defaults.store.uri),
                database: get_env_or_default("MONGODB_DATABASE", &defaults.store.database),
                connect_timeout: get_env_or_default(
                    "MONGODB_CONNECT_TIMEOUT",
                    &defaults.store.connect_timeout.to_string(),
                )
                .parse()
                .context("Invalid store connect timeout")?,
            },
            upstream: UpstreamConfig {
                base_url: get_env_or_default("UPSTREAM_BASE_URL", &defaults.upstream.base_url),
                model: get_env_or_default("UPSTREAM_MODEL", &defaults.upstream.model),
                timeout: get_env_or_default("UPSTREAM_TIMEOUT", &defaults.upstream.timeout.to_string())
                    .parse()
                    .context("Invalid upstream timeout")?,
                temperature: get_env_or_default(
                    "UPSTREAM_TEMPERATURE",
                    &defaults.upstream.temperature.to_string(),
                )
                .parse()
                .context("Invalid upstream temperature")?,
                max_output_tokens: get_env_or_default(
                    "UPSTREAM_MAX_OUTPUT_TOKENS",
                    &defaults.upstream.max_output_tokens.to_string(),
                )
                .parse()
                .context("Invalid upstream max output tokens")?,
            },
            passthrough: PassthroughConfig {
                enabled: get_env_or_default("PASSTHROUGH_ENABLED", "true")
                    .parse()
                    .context("Invalid pass-through enabled flag")?,
                base_url: get_env_or_default("PASSTHROUGH_BASE_URL", &defaults.passthrough.base_url),
                timeout: get_env_or_default(
                    "PASSTHROUGH_TIMEOUT",
                    &defaults.passthrough.timeout.to_string(),
                )
                .parse()
                .context("Invalid pass-through timeout")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", &defaults.logging.level),
                format: get_env_or_default("LOG_FORMAT", &defaults.logging.format),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Load from the environment, then apply the optional JSON config file on top
    pub fn load() -> Result<Self> {
        let mut settings = Self::new()?;

        if let Some(file) = FileConfig::load_default()? {
            settings.apply_file(&file);
            settings.validate()?;
        }

        Ok(settings)
    }

    /// Override upstream values with those present in a config file
    pub fn apply_file(&mut self, file: &FileConfig) {
        let Some(upstream) = &file.upstream else {
            return;
        };

        if let Some(base_url) = &upstream.base_url {
            self.upstream.base_url = base_url.clone();
        }
        if let Some(model) = &upstream.model {
            self.upstream.model = model.clone();
        }
        if let Some(timeout) = upstream.timeout {
            self.upstream.timeout = timeout;
        }
        if let Some(generation) = &upstream.generation_config {
            if let Some(temperature) = generation.temperature {
                self.upstream.temperature = temperature;
            }
            if let Some(max_output_tokens) = generation.max_output_tokens {
                self.upstream.max_output_tokens = max_output_tokens;
            }
        }
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if self.server.max_request_size == 0 {
            anyhow::bail!("Maximum request size cannot be 0");
        }

        if !self.store.uri.starts_with("mongodb://") && !self.store.uri.starts_with("mongodb+srv://") {
            anyhow::bail!("Invalid store URI, should start with 'mongodb://' or 'mongodb+srv://'");
        }

        if self.store.database.is_empty() {
            anyhow::bail!("Database name cannot be empty");
        }

        if !self.upstream.base_url.starts_with("http") {
            anyhow::bail!("Invalid upstream base URL format, should start with 'http'");
        }

        if self.upstream.model.is_empty() || self.upstream.model.contains(char::is_whitespace) {
            anyhow::bail!("Invalid upstream model identifier: '{}'", self.upstream.model);
        }

        if !(0.0..=2.0).contains(&self.upstream.temperature) {
            anyhow::bail!("Upstream temperature must be between 0.0 and 2.0");
        }

        if self.upstream.max_output_tokens == 0 {
            anyhow::bail!("Upstream max output tokens cannot be 0");
        }

        if self.passthrough.enabled && !self.passthrough.base_url.starts_with("http") {
            anyhow::bail!("Invalid pass-through base URL format, should start with 'http'");
        }

        if self.upstream.timeout == 0 || self.passthrough.timeout == 0 || self.store.connect_timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Full `generateContent` URL for the configured model
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.upstream.base_url.trim_end_matches('/'),
            self.upstream.model
        )
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout)
    }

    pub fn passthrough_timeout(&self) -> Duration {
        Duration::from_secs(self.passthrough.timeout)
    }

    /// Listen address as `host:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
