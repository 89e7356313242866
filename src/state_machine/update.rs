//! Partial state updates and the reducer that folds them into session state
//!
//! Messages are append-only; every other field is replaced when the update
//! mentions it. A field can be mentioned with a value (`Patch::Set`) or with
//! an explicit null (`Patch::Clear`), and the two must not be confused with
//! leaving the field out (`Patch::Keep`).

use super::state::{ChatMessage, SessionState, Step, VisualCode};

/// How a partial update treats one optional field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field omitted: keep the current value
    #[default]
    Keep,
    /// Field explicitly set to null
    Clear,
    /// Field set to a value
    Set(T),
}

impl<T> Patch<T> {
    /// `None` means an explicit null, not an omission
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }

    fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }

    #[cfg(test)]
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }
}

/// Partial session state produced by request input or by a transition node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    /// Appended to the log, in order
    pub messages: Vec<ChatMessage>,
    pub current_step: Patch<Step>,
    pub proposed_logic: Patch<String>,
    pub plan_context: Patch<String>,
    pub confirmed: Patch<bool>,
    pub feedback_text: Patch<String>,
    pub assistant_message: Patch<String>,
    pub visual_code: Patch<VisualCode>,
}

impl StateUpdate {
    /// Input for `/chat`: a new user message, with any stale feedback cleared
    pub fn user_message(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(text)],
            ..Self::default()
        }
        .clear_feedback()
    }

    /// Input for `/feedback`: the confirmation decision and optional reason
    pub fn feedback(confirmed: bool, feedback_text: Option<String>) -> Self {
        Self {
            confirmed: Patch::Set(confirmed),
            feedback_text: Patch::from_option(feedback_text),
            ..Self::default()
        }
    }

    /// Show `text` to the user and record it in the log
    pub fn reply(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            messages: vec![ChatMessage::assistant(text.clone())],
            assistant_message: Patch::Set(text),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.current_step = Patch::Set(step);
        self
    }

    /// Explicitly null the ephemeral confirmation fields
    #[must_use]
    pub fn clear_feedback(mut self) -> Self {
        self.confirmed = Patch::Clear;
        self.feedback_text = Patch::Clear;
        self
    }
}

impl SessionState {
    /// Fold `update` into this state in place.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            messages,
            current_step,
            proposed_logic,
            plan_context,
            confirmed,
            feedback_text,
            assistant_message,
            visual_code,
        } = update;

        self.messages.extend(messages);
        current_step.apply_to(&mut self.current_step);
        proposed_logic.apply_to(&mut self.proposed_logic);
        plan_context.apply_to(&mut self.plan_context);
        confirmed.apply_to(&mut self.confirmed);
        feedback_text.apply_to(&mut self.feedback_text);
        assistant_message.apply_to(&mut self.assistant_message);
        visual_code.apply_to(&mut self.visual_code);
    }
}

/// Reducer: `current` with `update` folded in. Total over its inputs.
pub fn merge(current: &SessionState, update: StateUpdate) -> SessionState {
    let mut next = current.clone();
    next.apply(update);
    next
}
