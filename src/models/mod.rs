//! Data models module
//!
//! Defines the chat envelope, the generative-language upstream shapes and the stored records

pub mod chat;
pub mod gemini;
pub mod records;

use serde::{Deserialize, Serialize};

/// Confirmation body returned by write routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResponse {
    pub message: String,
    /// Store-assigned id of the new record
    pub id: String,
}

/// Confirmation body returned by the seeding route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededResponse {
    pub message: String,
    pub inserted: u64,
}
