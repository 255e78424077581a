//! Chat forwarding handler
//!
//! Forwards a prompt to the generative-language provider and answers in the chat completion shape

use crate::handlers::{parse_body, AppState};
use crate::middleware::BearerCredential;
use crate::models::chat::ChatRequest;
use crate::utils::error::AppResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

/// Handle chat requests
///
/// POST /api/grok3
///
/// The credential is checked before the body, so a request without
/// `Authorization` is rejected whatever it carries.
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    credential: BearerCredential,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Response> {
    let request = parse_body(body)?;
    if let Some(model) = &request.model {
        debug!("Client asked for model '{}', using configured upstream model", model);
    }

    let contents = request.into_contents()?;
    let reply = state.gemini.generate(credential.token(), contents).await?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(reply.completion)).into_response())
}
