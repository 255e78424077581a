//! Error handling module
//!
//! Defines error types and handling logic used in the project

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder detail for upstream failures that carried no body
pub const NO_ADDITIONAL_DETAILS: &str = "No additional details";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Required request field absent or invalid
    #[error("{0}")]
    Validation(String),

    /// Bearer credential absent or malformed
    #[error("{0}")]
    MissingCredential(String),

    /// Lookup matched no records
    #[error("{0}")]
    NotFound(String),

    /// Store handle was never established
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store operation failed
    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    /// Upstream call failed or returned a non-2xx status
    #[error("{message}")]
    Upstream {
        /// Upstream status, when a response was received
        status: Option<u16>,
        message: String,
        details: serde_json::Value,
    },

    /// Route exists but has no implementation
    #[error("Not implemented")]
    NotImplemented,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MissingCredential(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            AppError::Upstream { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::StoreUnavailable(_)
            | AppError::Store { .. }
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error kind string, used in logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_request_error",
            AppError::MissingCredential(_) => "missing_credential_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::StoreUnavailable(_) | AppError::Store { .. } => "store_error",
            AppError::Upstream { .. } => "upstream_error",
            AppError::NotImplemented => "not_implemented_error",
            AppError::Serialization(_) | AppError::Internal(_) => "api_error",
        }
    }

    /// Whether the error is caused by the client rather than this service or its dependencies
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::MissingCredential(_) | AppError::NotFound(_)
        )
    }

    /// Convert to response body
    pub fn to_error_response(&self) -> ErrorResponse {
        let details = match self {
            AppError::Upstream { details, .. } => Some(details.clone()),
            _ => None,
        };

        ErrorResponse {
            error: self.to_string(),
            details,
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_client_error() {
            tracing::warn!("Client error: {} ({}) - Status code: {}", self, self.error_type(), status);
        } else {
            tracing::error!("Application error: {} ({}) - Status code: {}", self, self.error_type(), status);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create validation error
    pub fn validation_error(message: impl Into<String>) -> AppError {
        AppError::Validation(message.into())
    }

    /// Create validation error listing missing fields
    pub fn missing_fields_error(fields: &[&str]) -> AppError {
        AppError::Validation(format!("Missing required fields: {}", fields.join(", ")))
    }

    /// Create not found error
    pub fn not_found_error(message: impl Into<String>) -> AppError {
        AppError::NotFound(message.into())
    }

    /// Create upstream error without a response
    pub fn upstream_error(message: impl Into<String>) -> AppError {
        AppError::Upstream {
            status: None,
            message: message.into(),
            details: serde_json::Value::String(NO_ADDITIONAL_DETAILS.to_string()),
        }
    }

    /// Create internal error
    pub fn internal_error(message: impl Into<String>) -> AppError {
        AppError::Internal(message.into())
    }
}

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add store error context
    fn store_context(self, message: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Into<StoreError>,
{
    fn store_context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Store {
            context: message.to_string(),
            source: e.into(),
        })
    }
}
