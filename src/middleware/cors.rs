//! CORS middleware
//!
//! Fixed permissive policy: three headers on every response, preflight answered directly

use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use tracing::debug;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Answer any `OPTIONS` with an empty 200 and stamp CORS headers on all other responses
pub async fn cors_middleware(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        debug!("Answering preflight for {}", request.uri().path());
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::OK;
        preflight
    } else {
        next.run(request).await
    };

    apply_cors_headers(response.headers_mut());
    response
}

/// Insert the three CORS headers, replacing any set by a handler
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
}
