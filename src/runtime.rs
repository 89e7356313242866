//! Runtime for executing conversation turns
//!
//! A turn loads the session, folds in the request input, routes to one
//! transition node, runs it, folds in its output and persists the result.

mod executor;
mod nodes;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::TurnExecutor;
pub use traits::*;

use crate::llm::LlmError;
use crate::state_machine::{GraphError, Node};
use std::sync::Arc;
use thiserror::Error;

/// Type alias for the production executor behind trait objects
pub type SharedExecutor = TurnExecutor<Arc<dyn SessionStore>, Arc<dyn Collaborator>>;

/// Why a turn failed. A failed turn persists nothing.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("session store error: {0}")]
    Store(String),

    #[error("language model call failed: {0}")]
    Collaborator(#[from] LlmError),

    #[error("{node} produced output that does not match its shape: {detail}")]
    MalformedOutput { node: Node, detail: String },

    #[error("generated graph is invalid: {0}")]
    InvalidGraph(#[from] GraphError),
}
