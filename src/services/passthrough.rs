//! Verbatim pass-through client
//!
//! Forwards `/api/*` requests to a fixed host with the `/api` prefix removed

use crate::config::Settings;
use crate::services::gemini::error_details;
use crate::utils::error::{helpers::upstream_error, AppError, AppResult};
use anyhow::{Context, Result};
use axum::body::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::{debug, error};

/// Headers that describe a single hop and are never forwarded
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Response received from the pass-through host
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    /// End-to-end response headers, hop-by-hop ones removed
    pub headers: Vec<(String, Vec<u8>)>,
    pub body: Bytes,
}

/// Client for the pass-through host
#[derive(Debug, Clone)]
pub struct PassthroughClient {
    client: Client,
    base_url: String,
}

impl PassthroughClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.passthrough_timeout())
            .user_agent(concat!("linguix-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create pass-through HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.passthrough.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Target URL for an inbound `/api/...` path and optional query string
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let stripped = path.strip_prefix("/api").unwrap_or(path);
        let stripped = if stripped.is_empty() { "/" } else { stripped };

        match query {
            Some(query) if !query.is_empty() => format!("{}{}?{}", self.base_url, stripped, query),
            _ => format!("{}{}", self.base_url, stripped),
        }
    }

    /// Forward one request
    ///
    /// `headers` are given as name/value byte pairs so the caller's HTTP types stay out of this module.
    pub async fn forward(
        &self,
        method: &str,
        path: &str,
        query: Option<&str>,
        headers: Vec<(String, Vec<u8>)>,
        body: Bytes,
    ) -> AppResult<ForwardedResponse> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| upstream_error(format!("Unsupported method {}", method)))?;
        let url = self.target_url(path, query);
        debug!("Forwarding {} {}", method, url);

        let response = self
            .client
            .request(method, &url)
            .headers(forwardable_headers(headers))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("Pass-through request failed: {}", e);
                upstream_error(e.to_string())
            })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| upstream_error(format!("Failed to read pass-through response: {}", e)))?;

        if !status.is_success() {
            error!("Pass-through host returned {}", status);
            return Err(AppError::Upstream {
                status: Some(status.as_u16()),
                message: format!("Request failed with status code {}", status.as_u16()),
                details: error_details(&String::from_utf8_lossy(&body)),
            });
        }

        Ok(ForwardedResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.to_ascii_lowercase().as_str())
}

fn forwardable_headers(headers: Vec<(String, Vec<u8>)>) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for (name, value) in headers {
        if is_hop_by_hop(&name) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_bytes(&value)) {
            forwarded.append(name, value);
        }
    }
    forwarded
}
