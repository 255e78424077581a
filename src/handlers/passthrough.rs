//! Pass-through handler
//!
//! Router fallback: `/api/*` paths without an exact route are forwarded verbatim

use crate::handlers::AppState;
use crate::utils::error::{
    helpers::{not_found_error, validation_error},
    AppResult,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Whether `path` falls under the pass-through prefix
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Prefixes owned by the persistence lookups; an unmatched path under one has a bad parameter
const RECORD_LOOKUP_PREFIXES: &[&str] = &["/api/getQuizProgress/", "/api/progress/"];

/// Whether `path` sits under a persistence lookup route and must never leave the gateway
pub fn is_record_lookup_path(path: &str) -> bool {
    RECORD_LOOKUP_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Forward an unmatched `/api/*` request; anything else is 404
pub async fn forward(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let path = uri.path();
    if is_record_lookup_path(path) {
        return Err(validation_error(format!("Missing or invalid path parameters: {}", path)));
    }

    let client = match &state.passthrough {
        Some(client) if is_api_path(path) => client,
        _ => return Err(not_found_error(format!("Route not found: {} {}", method, path))),
    };

    let headers = headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
        .collect();

    let forwarded = client
        .forward(method.as_str(), path, uri.query(), headers, body)
        .await?;

    let status = StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::OK);
    let mut response = (status, forwarded.body).into_response();

    // Replace the defaults set for a bytes body with what the host sent
    let response_headers = response.headers_mut();
    response_headers.remove(CONTENT_TYPE);
    for (name, value) in forwarded.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_bytes(&value)) {
            response_headers.append(name, value);
        }
    }

    Ok(response)
}
