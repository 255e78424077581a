//! Middleware module
//!
//! Bearer credential extraction, CORS and request logging

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::BearerCredential;
pub use cors::cors_middleware;
pub use logging::request_logging_middleware;
