//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod chat;
pub mod health;
pub mod passthrough;
pub mod placeholder;
pub mod records;

use crate::config::Settings;
use crate::middleware::{cors_middleware, request_logging_middleware};
use crate::services::{GeminiClient, PassthroughClient, RecordService};
use crate::store::DocumentStore;
use crate::utils::error::{helpers::validation_error, AppResult};
use anyhow::Result;
use axum::{
    extract::rejection::JsonRejection,
    middleware::from_fn,
    routing::{any, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub gemini: GeminiClient,
    /// Present when the `/api/*` pass-through is enabled
    pub passthrough: Option<PassthroughClient>,
    pub records: RecordService,
}

impl AppState {
    pub fn new(settings: Settings, store: Option<Arc<dyn DocumentStore>>) -> Result<Self> {
        let gemini = GeminiClient::new(&settings)?;
        let passthrough = if settings.passthrough.enabled {
            Some(PassthroughClient::new(&settings)?)
        } else {
            None
        };

        Ok(Self {
            settings,
            gemini,
            passthrough,
            records: RecordService::new(store),
        })
    }
}

/// Create application router
///
/// `store` is the handle established at startup; `None` leaves every
/// persistence route failing with 500 while the rest keep working.
pub fn create_router(settings: Settings, store: Option<Arc<dyn DocumentStore>>) -> Result<Router> {
    let max_request_size = settings.server.max_request_size;
    let app_state = Arc::new(AppState::new(settings, store)?);

    if app_state.passthrough.is_some() {
        info!("🔀 Pass-through enabled: /api/* -> {}", app_state.settings.passthrough.base_url);
    }

    // Outermost first
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_logging_middleware))
        .layer(from_fn(cors_middleware))
        .layer(RequestBodyLimitLayer::new(max_request_size));

    let router = Router::new()
        .route("/api/grok3", post(chat::handle_chat))
        .route("/api/saveQuizProgress", post(records::save_quiz_progress))
        .route("/api/getQuizProgress", get(records::missing_user_id))
        .route("/api/getQuizProgress/", get(records::missing_user_id))
        .route("/api/getQuizProgress/:userId", get(records::get_quiz_progress))
        .route("/api/getAssignments", get(records::get_assignments))
        .route("/api/insertSampleAssignments", post(records::insert_sample_assignments))
        .route("/api/saveAssignment", post(records::save_assignment))
        .route("/api/progress", post(records::save_progress))
        .route("/api/progress/", get(records::missing_user_id))
        .route("/api/progress/:userId", get(records::missing_language))
        .route("/api/progress/:userId/", get(records::missing_language))
        .route("/api/progress/:userId/:language", get(records::get_progress))
        .route("/api/ai-suggestion", any(placeholder::not_implemented))
        .route("/api/daily-words", any(placeholder::not_implemented))
        .route("/api/exercises", any(placeholder::not_implemented))
        .route("/api/dialogues", any(placeholder::not_implemented))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .fallback(passthrough::forward)
        .with_state(app_state)
        .layer(middleware_stack);

    Ok(router)
}

/// Unwrap a JSON body, reporting malformed input as a validation error
pub(crate) fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| validation_error(format!("Invalid request body: {}", rejection.body_text())))
}
