//! Configuration management module
//!
//! Responsible for loading application configuration from environment variables and an optional JSON file

pub mod file;
pub mod settings;

pub use file::{FileConfig, FileGenerationConfig, FileUpstreamConfig};
pub use settings::{LoggingConfig, PassthroughConfig, ServerConfig, Settings, StoreConfig, UpstreamConfig};
