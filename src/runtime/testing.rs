//! Mock implementations for testing
//!
//! These mocks enable turn-level testing without a language model.

use super::traits::{Collaborator, SessionStore, StructuredRequest};
use crate::llm::LlmError;
use crate::state_machine::SessionState;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock Collaborator
// ============================================================================

/// Mock collaborator that returns queued replies
#[derive(Default)]
pub struct MockCollaborator {
    responses: Mutex<VecDeque<Result<Value, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<StructuredRequest>>,
}

impl MockCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn queue_response(&self, response: Value) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<StructuredRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Collaborator for MockCollaborator {
    async fn complete(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// Store whose reads or writes always fail
pub struct FailingStore {
    pub fail_get: bool,
    pub fail_put: bool,
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn get(&self, _session_id: &str) -> Result<SessionState, String> {
        if self.fail_get {
            return Err("store unavailable".to_string());
        }
        Ok(SessionState::default())
    }

    async fn put(&self, _session_id: &str, _state: SessionState) -> Result<(), String> {
        if self.fail_put {
            return Err("store unavailable".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Reply fixtures
// ============================================================================

pub fn interpret_reply() -> Value {
    json!({
        "plan_context": "A kitchen timer that rings when time is up.",
        "proposed_logic": "Start -> Count down -> Ring",
        "assistant_message": "I understood your idea as a kitchen timer. To build this, we need steps Start -> Count down -> Ring. Is this correct?"
    })
}

pub fn refine_reply() -> Value {
    json!({
        "assistant_message": "Think of it like a doorbell: what should press the button? Should the timer start on a tap, or at a set time?"
    })
}

pub fn graph_reply() -> Value {
    json!({
        "nodes": [
            {"id": "n1", "type": "Trigger", "label": "Tap start", "description": "The user taps the start button."},
            {"id": "n2", "type": "Action", "label": "Count down", "description": "The clock ticks down each second."},
            {"id": "n3", "type": "Condition", "label": "Time up?", "description": "Check whether the clock reached zero."},
            {"id": "n4", "type": "UI", "label": "Ring", "description": "Show an alert and play a sound."}
        ],
        "edges": [
            {"source": "n1", "target": "n2"},
            {"source": "n2", "target": "n3"},
            {"source": "n3", "target": "n4"}
        ],
        "summary": "Tapping start counts down, and the timer rings when it reaches zero."
    })
}
