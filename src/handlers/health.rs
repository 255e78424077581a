//! Health check handlers
//!
//! Provides application health status check endpoints

use crate::handlers::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Version information
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Document store state: `connected`, `unreachable`, `not_configured` or `not_checked`
    pub store: String,
    /// Configured upstream model
    pub upstream_model: String,
    pub passthrough_enabled: bool,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<MemoryUsage>,
}

/// Memory usage information
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Used memory in bytes
    pub used_bytes: u64,
    /// Total memory in bytes
    pub total_bytes: u64,
    /// Usage percentage
    pub usage_percent: f64,
}

/// Health check
///
/// GET /health
/// Reports `degraded` when the document store is unset or does not answer a ping.
/// Always answers 200.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");

    let store = match state.records.store() {
        Some(store) => match store.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!("Store ping failed during health check: {}", e);
                "unreachable"
            }
        },
        None => "not_configured",
    };

    let status = if store == "connected" { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: Some(HealthDetails {
            store: store.to_string(),
            upstream_model: state.settings.upstream.model.clone(),
            passthrough_enabled: state.passthrough.is_some(),
            uptime_seconds: get_uptime_seconds(),
            memory_usage: get_memory_usage(),
        }),
    })
}

/// Liveness check
///
/// GET /health/live
/// Confirms the process is running without touching external dependencies
pub async fn liveness_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing liveness check");

    Json(HealthResponse {
        status: "alive".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: Some(HealthDetails {
            store: "not_checked".to_string(),
            upstream_model: state.settings.upstream.model.clone(),
            passthrough_enabled: state.passthrough.is_some(),
            uptime_seconds: get_uptime_seconds(),
            memory_usage: get_memory_usage(),
        }),
    })
}

/// Get service uptime in seconds
pub fn get_uptime_seconds() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START_TIME: OnceLock<Instant> = OnceLock::new();

    START_TIME.get_or_init(Instant::now).elapsed().as_secs()
}

/// Get memory usage information
#[cfg(target_os = "linux")]
fn get_memory_usage() -> Option<MemoryUsage> {
    // VmRSS and VmSize are reported in kB
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let read_kb = |key: &str| {
        status
            .lines()
            .find(|line| line.starts_with(key))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb * 1024)
    };

    let used = read_kb("VmRSS:")?;
    let total = read_kb("VmSize:")?;
    let usage_percent = if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    Some(MemoryUsage {
        used_bytes: used,
        total_bytes: total,
        usage_percent,
    })
}

#[cfg(not(target_os = "linux"))]
fn get_memory_usage() -> Option<MemoryUsage> {
    None
}
