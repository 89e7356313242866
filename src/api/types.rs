//! API request and response types

use crate::state_machine::{ChatStatus, SessionState, Step, VisualCode};
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

/// Body of `POST /feedback`
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub session_id: String,
    pub confirmed: bool,
    #[serde(default)]
    pub feedback_text: Option<String>,
}

/// View of the session returned after every turn
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub status: ChatStatus,
    pub session_id: String,
    pub current_step: Step,
    pub assistant_message: String,
    pub proposed_logic: Option<String>,
    pub plan_context: Option<String>,
    pub visual_code: Option<VisualCode>,
}

impl ChatResponse {
    pub fn from_state(session_id: String, state: SessionState) -> Self {
        Self {
            status: state.status(),
            session_id,
            current_step: state.current_step.unwrap_or(Step::Ask),
            assistant_message: state.assistant_message.unwrap_or_default(),
            proposed_logic: state.proposed_logic,
            plan_context: state.plan_context,
            visual_code: state.visual_code,
        }
    }
}

/// Liveness probe body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
