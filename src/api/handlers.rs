//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, FeedbackRequest, HealthResponse};
use super::AppState;
use crate::state_machine::StateUpdate;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/feedback", post(feedback))
        .route("/health", get(health))
        .with_state(state)
}

// ============================================================
// Turns
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let session_id = require_session_id(req.session_id)?;

    run_turn(&state, session_id, StateUpdate::user_message(req.message)).await
}

async fn feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let session_id = require_session_id(req.session_id)?;

    let input = StateUpdate::feedback(req.confirmed, req.feedback_text);
    run_turn(&state, session_id, input).await
}

async fn run_turn(
    state: &AppState,
    session_id: String,
    input: StateUpdate,
) -> Result<Json<ChatResponse>, AppError> {
    let next = state
        .executor
        .handle(&session_id, input)
        .await
        .map_err(|_| AppError::Internal("Failed to process turn".to_string()))?;

    Ok(Json(ChatResponse::from_state(session_id, next)))
}

fn require_session_id(session_id: String) -> Result<String, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id must not be empty".to_string()));
    }
    Ok(session_id)
}

// ============================================================
// Health
// ============================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

// ============================================================
// Error Handling
// ============================================================

/// Turn failures are logged by the executor; the client only sees a
/// generic message.
#[derive(Debug)]
enum AppError {
    InvalidRequest(JsonRejection),
    BadRequest(String),
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(rejection) => (rejection.status(), rejection.body_text()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
