//! Linguix Gateway Server
//!
//! HTTP service that forwards chat prompts to a generative-language provider
//! and persists quiz progress, progress and assignments in MongoDB

use anyhow::{Context, Result};
use linguix_gateway::config::Settings;
use linguix_gateway::handlers::{create_router, health};
use linguix_gateway::store::{DocumentStore, MongoStore};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Anchor uptime at process start
    health::get_uptime_seconds();

    let settings = Settings::load().context("Failed to load server settings")?;

    init_logging(&settings.logging.level, &settings.logging.format);
    info!("Server settings loaded");
    info!("🤖 Upstream model: {} ({})", settings.upstream.model, settings.upstream.base_url);

    // One connection attempt; on failure persistence routes answer 500
    let store: Option<Arc<dyn DocumentStore>> = match MongoStore::connect(&settings.store).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            error!("MongoDB connection failed, persistence routes disabled: {}", e);
            None
        }
    };

    let addr = settings.listen_addr();
    let app = create_router(settings, store)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Linguix Gateway started!");
    info!("📝 Health check: http://{}/health", addr);
    info!("💬 Chat endpoint: http://{}/api/grok3", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

/// Initialize logging system
fn init_logging(default_level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging system initialized");
}
