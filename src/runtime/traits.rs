//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the turn executor with mock implementations.

use crate::llm::{
    LlmError, LlmMessage, LlmRequest, MessageRole, ModelRegistry, ResponseSchema, SystemContent,
};
use crate::state_machine::{ChatMessage, Role, SessionState};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage for per-session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored state, or the all-unset default for an unseen session id
    async fn get(&self, session_id: &str) -> Result<SessionState, String>;

    /// Replace the stored state unconditionally
    async fn put(&self, session_id: &str, state: SessionState) -> Result<(), String>;
}

/// One request to the language-model collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub system: Vec<String>,
    pub conversation: Vec<ChatMessage>,
    pub shape: ResponseSchema,
}

/// The language-model service as seen by the transition nodes
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Produce a JSON value meant to match `request.shape`. Conformance is
    /// checked by the caller.
    async fn complete(&self, request: &StructuredRequest) -> Result<Value, LlmError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, session_id: &str) -> Result<SessionState, String> {
        (**self).get(session_id).await
    }

    async fn put(&self, session_id: &str, state: SessionState) -> Result<(), String> {
        (**self).put(session_id, state).await
    }
}

#[async_trait]
impl<T: Collaborator + ?Sized> Collaborator for Arc<T> {
    async fn complete(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        (**self).complete(request).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Process-wide session map. Contents are lost on restart.
///
/// Reads and writes are individually atomic, but nothing spans a whole
/// turn: two concurrent turns on one session race and the later `put` wins.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<SessionState, String> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, session_id: &str, state: SessionState) -> Result<(), String> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), state);
        Ok(())
    }
}

const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Adapter to use `ModelRegistry` as the collaborator
pub struct LlmCollaborator {
    registry: Arc<ModelRegistry>,
    model_id: String,
    temperature: f32,
}

impl LlmCollaborator {
    pub fn new(registry: Arc<ModelRegistry>, model_id: String, temperature: f32) -> Self {
        Self {
            registry,
            model_id,
            temperature,
        }
    }

    /// Conversation messages with the system role join the system prompt;
    /// providers only accept user/assistant turns in the message list.
    /// Blank user turns stay in the session log but are not sent, since
    /// Anthropic rejects whitespace-only text blocks.
    fn build_request(&self, request: &StructuredRequest) -> LlmRequest {
        let mut system: Vec<SystemContent> =
            request.system.iter().map(SystemContent::new).collect();
        let mut messages = Vec::with_capacity(request.conversation.len());

        for msg in &request.conversation {
            match msg.role {
                Role::System => system.push(SystemContent::new(&msg.content)),
                Role::User if msg.content.trim().is_empty() => {}
                Role::User => messages.push(LlmMessage::text(MessageRole::User, &msg.content)),
                Role::Assistant => {
                    messages.push(LlmMessage::text(MessageRole::Assistant, &msg.content));
                }
            }
        }

        LlmRequest {
            system,
            messages,
            max_tokens: Some(MAX_OUTPUT_TOKENS),
            temperature: Some(self.temperature),
            response_schema: Some(request.shape.clone()),
        }
    }
}

#[async_trait]
impl Collaborator for LlmCollaborator {
    async fn complete(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        let llm = self
            .registry
            .get(&self.model_id)
            .or_else(|| self.registry.default())
            .ok_or_else(|| LlmError::network("No LLM available"))?;

        let response = llm.complete(&self.build_request(request)).await?;
        Ok(response.structured_output(&request.shape.name))
    }
}
