//! Reserved routes with no behavior yet

use crate::utils::error::AppError;

/// /api/ai-suggestion, /api/daily-words, /api/exercises, /api/dialogues (any method)
pub async fn not_implemented() -> AppError {
    AppError::NotImplemented
}
