//! Router: picks the single transition node a turn executes

use super::state::{SessionState, Step};
use std::fmt;

/// Transition nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Ask,
    Interpret,
    Refine,
    Generate,
    ConfirmWait,
    CompletedWait,
}

impl Node {
    #[cfg(test)]
    pub const ALL: [Node; 6] = [
        Node::Ask,
        Node::Interpret,
        Node::Refine,
        Node::Generate,
        Node::ConfirmWait,
        Node::CompletedWait,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Node::Ask => "ask",
            Node::Interpret => "interpret",
            Node::Refine => "refine",
            Node::Generate => "generate",
            Node::ConfirmWait => "confirm_wait",
            Node::CompletedWait => "completed_wait",
        }
    }

    /// Whether executing this node calls the language model
    pub fn calls_collaborator(self) -> bool {
        matches!(self, Node::Interpret | Node::Refine | Node::Generate)
    }

    /// Whether the turn consumes `confirmed` and `feedback_text`. Only
    /// `confirm_wait` keeps them, since it is still waiting on that answer.
    pub fn clears_feedback(self) -> bool {
        self != Node::ConfirmWait
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide which node runs next. Pure and total.
///
/// | `current_step` | `confirmed` | last user message | node             |
/// |----------------|-------------|-------------------|------------------|
/// | unset or ask   | -           | present           | `interpret`      |
/// | unset or ask   | -           | absent            | `ask`            |
/// | confirm        | true        | -                 | `generate`       |
/// | confirm        | false       | -                 | `refine`         |
/// | confirm        | unset       | -                 | `confirm_wait`   |
/// | generate       | -           | -                 | `completed_wait` |
///
/// An unset step is the initial state and behaves as `ask`: an empty fresh
/// session gets the opener, while a fresh session whose first turn already
/// carries an idea goes straight to `interpret`.
pub fn route(state: &SessionState) -> Node {
    match state.current_step {
        None | Some(Step::Ask) => {
            if state.last_user_message().is_some() {
                Node::Interpret
            } else {
                Node::Ask
            }
        }
        Some(Step::Confirm) => match state.confirmed {
            Some(true) => Node::Generate,
            Some(false) => Node::Refine,
            None => Node::ConfirmWait,
        },
        Some(Step::Generate) => Node::CompletedWait,
    }
}
