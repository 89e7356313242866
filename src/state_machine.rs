//! Conversation state machine
//!
//! Pure pieces only: session state, the reducer that folds partial updates
//! into it, and the router that chooses the next transition node. The
//! async node handlers that talk to the language model live in `runtime`.

mod route;
pub mod state;
mod update;

#[cfg(test)]
mod proptests;

pub use route::{route, Node};
pub use state::{
    ChatMessage, ChatStatus, GraphError, NodeType, Role, SessionState, Step, VisualCode,
};
pub use update::{merge, Patch, StateUpdate};
