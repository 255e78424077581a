//! Bearer credential extraction
//!
//! The gateway does not authenticate callers. It only lifts the caller's API key
//! out of `Authorization` so it can be forwarded to the upstream provider.

use crate::utils::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

/// API key taken from an `Authorization: Bearer <token>` header
///
/// Rejects with [`AppError::MissingCredential`] (400) when the header is
/// absent or does not carry a usable bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCredential(pub String);

impl BearerCredential {
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Parse the credential out of request headers
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let header = headers.get(AUTHORIZATION).ok_or_else(|| {
            warn!("Missing authentication header: Authorization");
            AppError::MissingCredential("Missing Authorization header".to_string())
        })?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| validate_token_format(token))
            .ok_or_else(|| {
                warn!("Malformed Authorization header");
                AppError::MissingCredential(
                    "Malformed Authorization header, expected 'Bearer <token>'".to_string(),
                )
            })?;

        debug!("Bearer credential extracted");
        Ok(Self(token.to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerCredential
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

/// Validate token format
pub fn validate_token_format(token: &str) -> bool {
    // Provider keys vary in shape, so only reject what can never be a key
    !token.is_empty() && !token.contains(char::is_whitespace)
}
