//! Persistence handlers
//!
//! Quiz progress, progress and assignment routes

use crate::handlers::{parse_body, AppState};
use crate::models::records::*;
use crate::models::{SavedResponse, SeededResponse};
use crate::utils::error::{helpers::validation_error, AppError, AppResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// POST /api/saveQuizProgress
pub async fn save_quiz_progress(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SaveQuizProgressRequest>, JsonRejection>,
) -> AppResult<Json<SavedResponse>> {
    let id = state.records.save_quiz_progress(parse_body(body)?).await?;
    Ok(Json(SavedResponse {
        message: "Progress saved".to_string(),
        id,
    }))
}

/// GET /api/getQuizProgress/:userId
pub async fn get_quiz_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<QuizProgressView>>> {
    Ok(Json(state.records.quiz_progress_for_user(&user_id).await?))
}

/// GET /api/getQuizProgress with no user id
pub async fn missing_user_id() -> AppError {
    validation_error("Missing userId")
}

/// GET /api/progress/:userId with no language
pub async fn missing_language() -> AppError {
    validation_error("Missing language")
}

/// GET /api/getAssignments
pub async fn get_assignments(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<AssignmentView>>> {
    Ok(Json(state.records.list_assignments().await?))
}

/// POST /api/insertSampleAssignments
pub async fn insert_sample_assignments(State(state): State<Arc<AppState>>) -> AppResult<Json<SeededResponse>> {
    let inserted = state.records.insert_sample_assignments().await?;
    let message = if inserted > 0 {
        "Sample assignments inserted"
    } else {
        "Assignments already exist, nothing inserted"
    };

    Ok(Json(SeededResponse {
        message: message.to_string(),
        inserted,
    }))
}

/// POST /api/saveAssignment
pub async fn save_assignment(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SaveAssignmentRequest>, JsonRejection>,
) -> AppResult<Json<SavedResponse>> {
    let id = state.records.save_assignment(parse_body(body)?).await?;
    Ok(Json(SavedResponse {
        message: "Assignment saved".to_string(),
        id,
    }))
}

/// POST /api/progress
pub async fn save_progress(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SaveProgressRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SavedResponse>)> {
    let id = state.records.save_progress(parse_body(body)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(SavedResponse {
            message: "Progress saved successfully".to_string(),
            id,
        }),
    ))
}

/// GET /api/progress/:userId/:language
///
/// Newest first; 404 when the user has no progress in that language.
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path((user_id, language)): Path<(String, String)>,
) -> AppResult<Json<Vec<ProgressView>>> {
    Ok(Json(state.records.progress_for(&user_id, &language).await?))
}
