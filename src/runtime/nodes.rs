//! Transition node handlers
//!
//! Each node reads the merged session state and returns a partial update.
//! Every node appends exactly one assistant message. All nodes except
//! `confirm_wait` explicitly null `confirmed` and `feedback_text`.

use super::traits::{Collaborator, StructuredRequest};
use super::TurnError;
use crate::prompts;
use crate::state_machine::{ChatMessage, Node, Patch, SessionState, StateUpdate, Step, VisualCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct InterpretOutput {
    plan_context: String,
    proposed_logic: String,
    assistant_message: String,
}

#[derive(Debug, Deserialize)]
struct RefineOutput {
    assistant_message: String,
}

/// Execute one node against `state`
pub async fn run<C: Collaborator + ?Sized>(
    node: Node,
    state: &SessionState,
    collaborator: &C,
) -> Result<StateUpdate, TurnError> {
    let update = match node {
        Node::Ask => ask(),
        Node::Interpret => interpret(state, collaborator).await?,
        Node::Refine => refine(state, collaborator).await?,
        Node::Generate => generate(state, collaborator).await?,
        Node::ConfirmWait => confirm_wait(),
        Node::CompletedWait => completed_wait(),
    };

    if node.clears_feedback() {
        Ok(update.clear_feedback())
    } else {
        Ok(update)
    }
}

fn ask() -> StateUpdate {
    StateUpdate::reply(prompts::ASK_MESSAGE).with_step(Step::Ask)
}

async fn interpret<C: Collaborator + ?Sized>(
    state: &SessionState,
    collaborator: &C,
) -> Result<StateUpdate, TurnError> {
    let request = StructuredRequest {
        system: vec![
            prompts::SYSTEM_PROMPT.to_string(),
            prompts::INTERPRET_PROMPT.to_string(),
        ],
        conversation: state.messages.clone(),
        shape: prompts::interpret_shape(),
    };
    let out: InterpretOutput = complete_as(collaborator, Node::Interpret, &request).await?;

    let mut update = StateUpdate::reply(out.assistant_message).with_step(Step::Confirm);
    update.proposed_logic = Patch::Set(out.proposed_logic);
    update.plan_context = Patch::Set(out.plan_context);
    Ok(update)
}

/// Back to `ask`, so the user's answer is re-interpreted as a fresh idea
async fn refine<C: Collaborator + ?Sized>(
    state: &SessionState,
    collaborator: &C,
) -> Result<StateUpdate, TurnError> {
    let context = prompts::refine_context(
        state.proposed_logic.as_deref(),
        state.feedback_text.as_deref(),
    );
    let request = StructuredRequest {
        system: vec![
            prompts::SYSTEM_PROMPT.to_string(),
            prompts::REFINE_PROMPT.to_string(),
        ],
        conversation: with_context(context, &state.messages),
        shape: prompts::refine_shape(),
    };
    let out: RefineOutput = complete_as(collaborator, Node::Refine, &request).await?;

    Ok(StateUpdate::reply(out.assistant_message).with_step(Step::Ask))
}

fn confirm_wait() -> StateUpdate {
    StateUpdate::reply(prompts::CONFIRM_WAIT_MESSAGE)
}

async fn generate<C: Collaborator + ?Sized>(
    state: &SessionState,
    collaborator: &C,
) -> Result<StateUpdate, TurnError> {
    let context = prompts::generate_context(
        state.plan_context.as_deref().unwrap_or_default(),
        state.proposed_logic.as_deref().unwrap_or_default(),
    );
    let request = StructuredRequest {
        system: vec![
            prompts::SYSTEM_PROMPT.to_string(),
            prompts::GENERATE_PROMPT.to_string(),
        ],
        conversation: with_context(context, &state.messages),
        shape: prompts::visual_code_shape(),
    };
    let graph: VisualCode = complete_as(collaborator, Node::Generate, &request).await?;
    graph.validate()?;

    let mut update = StateUpdate::reply(graph.summary.clone()).with_step(Step::Generate);
    update.visual_code = Patch::Set(graph);
    Ok(update)
}

fn completed_wait() -> StateUpdate {
    StateUpdate::reply(prompts::COMPLETED_MESSAGE)
}

fn with_context(context: String, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut conversation = Vec::with_capacity(history.len() + 1);
    conversation.push(ChatMessage::user(context));
    conversation.extend_from_slice(history);
    conversation
}

/// Call the collaborator and decode its reply into the node's expected shape
async fn complete_as<T, C>(
    collaborator: &C,
    node: Node,
    request: &StructuredRequest,
) -> Result<T, TurnError>
where
    T: DeserializeOwned,
    C: Collaborator + ?Sized,
{
    let value = collaborator.complete(request).await?;
    serde_json::from_value(value).map_err(|e| TurnError::MalformedOutput {
        node,
        detail: e.to_string(),
    })
}
