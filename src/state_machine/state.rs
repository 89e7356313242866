//! Session state types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Conversation Log
// ============================================================================

/// Author of a message in the conversation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One entry of the append-only conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// ============================================================================
// Conversation Step
// ============================================================================

/// Persisted position of the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Waiting for the user to describe (or re-describe) their idea
    Ask,
    /// Proposed logic shown, waiting for YES/NO
    Confirm,
    /// Graph produced; the session is finished
    Generate,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Ask => "ask",
            Step::Confirm => "confirm",
            Step::Generate => "generate",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Visual Code (flow-chart graph)
// ============================================================================

/// Kind of block in the generated flow chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Trigger,
    Action,
    Condition,
    #[serde(rename = "UI")]
    Ui,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Trigger,
        NodeType::Action,
        NodeType::Condition,
        NodeType::Ui,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Trigger => "Trigger",
            NodeType::Action => "Action",
            NodeType::Condition => "Condition",
            NodeType::Ui => "UI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Node/edge graph handed to the flow-chart renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualCode {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub summary: String,
}

/// Structural problems in a generated graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph has no nodes")]
    NoNodes,
    #[error("graph node has an empty id")]
    EmptyNodeId,
    #[error("duplicate node id {0:?}")]
    DuplicateNodeId(String),
    #[error("edge {from:?} -> {to:?} references an unknown node")]
    DanglingEdge { from: String, to: String },
}

impl VisualCode {
    /// Check that the graph is renderable: at least one node, unique
    /// non-empty ids, and edges only between known nodes.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::NoNodes);
        }

        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.id.trim().is_empty() {
                return Err(GraphError::EmptyNodeId);
            }
            if !ids.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
        }

        for edge in &self.edges {
            if !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()) {
                return Err(GraphError::DanglingEdge {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Everything remembered about one session between turns.
///
/// `Default` is the state of a session id that has never been seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Append-only conversation history
    pub messages: Vec<ChatMessage>,
    pub current_step: Option<Step>,
    /// Plain-language steps produced by interpretation
    pub proposed_logic: Option<String>,
    /// Short summary of the user's intent
    pub plan_context: Option<String>,
    /// Ephemeral: YES/NO answer from the latest feedback
    pub confirmed: Option<bool>,
    /// Ephemeral: free-text reason accompanying a NO
    pub feedback_text: Option<String>,
    pub assistant_message: Option<String>,
    pub visual_code: Option<VisualCode>,
}

/// Coarse status shown to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Chat,
    Confirm,
    Completed,
}

impl SessionState {
    /// Content of the most recent user message, trimmed.
    ///
    /// Only the latest user entry is considered; if it is blank the result
    /// is `None` even when an earlier user message had content.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.trim())
            .filter(|content| !content.is_empty())
    }

    pub fn status(&self) -> ChatStatus {
        match self.current_step {
            Some(Step::Confirm) => ChatStatus::Confirm,
            Some(Step::Generate) if self.visual_code.is_some() => ChatStatus::Completed,
            _ => ChatStatus::Chat,
        }
    }
}
