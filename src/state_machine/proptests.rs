//! Property-based tests for the reducer and router
//!
//! These tests verify key invariants hold across all possible inputs.

use super::route::{route, Node};
use super::state::*;
use super::update::{merge, Patch, StateUpdate};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant), Just(Role::System)]
}

fn arb_message() -> impl Strategy<Value = ChatMessage> {
    (arb_role(), "[a-zA-Z ?\n]{0,30}").prop_map(|(role, content)| ChatMessage { role, content })
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![Just(Step::Ask), Just(Step::Confirm), Just(Step::Generate)]
}

fn arb_node_type() -> impl Strategy<Value = NodeType> {
    prop_oneof![
        Just(NodeType::Trigger),
        Just(NodeType::Action),
        Just(NodeType::Condition),
        Just(NodeType::Ui),
    ]
}

fn arb_visual_code() -> impl Strategy<Value = VisualCode> {
    (
        proptest::collection::vec((arb_node_type(), "[a-z]{1,10}"), 1..4),
        "[a-zA-Z ]{0,30}",
    )
        .prop_map(|(nodes, summary)| {
            let nodes: Vec<GraphNode> = nodes
                .into_iter()
                .enumerate()
                .map(|(i, (node_type, label))| GraphNode {
                    id: format!("n{}", i + 1),
                    node_type,
                    label,
                    description: String::new(),
                })
                .collect();
            let edges = nodes
                .windows(2)
                .map(|pair| GraphEdge {
                    source: pair[0].id.clone(),
                    target: pair[1].id.clone(),
                })
                .collect();
            VisualCode {
                nodes,
                edges,
                summary,
            }
        })
}

fn arb_patch<T: std::fmt::Debug + Clone + 'static>(
    value: impl Strategy<Value = T> + 'static,
) -> impl Strategy<Value = Patch<T>> {
    prop_oneof![
        Just(Patch::Keep),
        Just(Patch::Clear),
        value.prop_map(Patch::Set),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z ]{0,20}"
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    (
        proptest::collection::vec(arb_message(), 0..6),
        proptest::option::of(arb_step()),
        proptest::option::of(arb_text()),
        proptest::option::of(arb_text()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(arb_text()),
        proptest::option::of(arb_text()),
        proptest::option::of(arb_visual_code()),
    )
        .prop_map(
            |(
                messages,
                current_step,
                proposed_logic,
                plan_context,
                confirmed,
                feedback_text,
                assistant_message,
                visual_code,
            )| SessionState {
                messages,
                current_step,
                proposed_logic,
                plan_context,
                confirmed,
                feedback_text,
                assistant_message,
                visual_code,
            },
        )
}

fn arb_update() -> impl Strategy<Value = StateUpdate> {
    (
        proptest::collection::vec(arb_message(), 0..3),
        arb_patch(arb_step()),
        arb_patch(arb_text()),
        arb_patch(arb_text()),
        arb_patch(any::<bool>()),
        arb_patch(arb_text()),
        arb_patch(arb_text()),
        arb_patch(arb_visual_code()),
    )
        .prop_map(
            |(
                messages,
                current_step,
                proposed_logic,
                plan_context,
                confirmed,
                feedback_text,
                assistant_message,
                visual_code,
            )| StateUpdate {
                messages,
                current_step,
                proposed_logic,
                plan_context,
                confirmed,
                feedback_text,
                assistant_message,
                visual_code,
            },
        )
}

/// Expected value of one field after merging
fn expected<T: Clone>(current: &Option<T>, patch: &Patch<T>) -> Option<T> {
    match patch {
        Patch::Keep => current.clone(),
        Patch::Clear => None,
        Patch::Set(v) => Some(v.clone()),
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: the message log only grows, and the old log is a prefix
    #[test]
    fn prop_messages_append_only(state in arb_state(), update in arb_update()) {
        let appended = update.messages.clone();
        let next = merge(&state, update);

        prop_assert_eq!(next.messages.len(), state.messages.len() + appended.len());
        prop_assert_eq!(&next.messages[..state.messages.len()], &state.messages[..]);
        prop_assert_eq!(&next.messages[state.messages.len()..], &appended[..]);
    }

    // Invariant 2: omitted fields survive, cleared fields are None, set fields replace
    #[test]
    fn prop_field_replacement_semantics(state in arb_state(), update in arb_update()) {
        let next = merge(&state, update.clone());

        prop_assert_eq!(next.current_step, expected(&state.current_step, &update.current_step));
        prop_assert_eq!(&next.proposed_logic, &expected(&state.proposed_logic, &update.proposed_logic));
        prop_assert_eq!(&next.plan_context, &expected(&state.plan_context, &update.plan_context));
        prop_assert_eq!(next.confirmed, expected(&state.confirmed, &update.confirmed));
        prop_assert_eq!(&next.feedback_text, &expected(&state.feedback_text, &update.feedback_text));
        prop_assert_eq!(
            &next.assistant_message,
            &expected(&state.assistant_message, &update.assistant_message)
        );
        prop_assert_eq!(&next.visual_code, &expected(&state.visual_code, &update.visual_code));
    }

    // Invariant 3: merging a sequence of updates never shrinks the log
    #[test]
    fn prop_log_monotonic_across_turns(
        state in arb_state(),
        updates in proptest::collection::vec(arb_update(), 0..8)
    ) {
        let mut current = state;
        for update in updates {
            let next = merge(&current, update);
            prop_assert!(next.messages.len() >= current.messages.len());
            current = next;
        }
    }

    // Invariant 4: routing is pure
    #[test]
    fn prop_route_is_deterministic(state in arb_state()) {
        let copy = state.clone();
        prop_assert_eq!(route(&state), route(&copy));
        prop_assert_eq!(state, copy);
    }

    // Invariant 5: routing agrees with the decision table for every state
    #[test]
    fn prop_route_matches_table(state in arb_state()) {
        let node = route(&state);
        let expected = match (state.current_step, state.confirmed) {
            (None | Some(Step::Ask), _) => {
                let last_user = state
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.trim().to_string())
                    .unwrap_or_default();
                if last_user.is_empty() { Node::Ask } else { Node::Interpret }
            }
            (Some(Step::Confirm), Some(true)) => Node::Generate,
            (Some(Step::Confirm), Some(false)) => Node::Refine,
            (Some(Step::Confirm), None) => Node::ConfirmWait,
            (Some(Step::Generate), _) => Node::CompletedWait,
        };
        prop_assert_eq!(node, expected);
    }

    // Invariant 6: feedback input only touches the ephemeral fields
    #[test]
    fn prop_feedback_input_is_narrow(
        state in arb_state(),
        confirmed in any::<bool>(),
        text in proptest::option::of(arb_text())
    ) {
        let next = merge(&state, StateUpdate::feedback(confirmed, text.clone()));

        prop_assert_eq!(next.confirmed, Some(confirmed));
        prop_assert_eq!(&next.feedback_text, &text);
        prop_assert_eq!(&next.messages, &state.messages);
        prop_assert_eq!(next.current_step, state.current_step);
        prop_assert_eq!(&next.visual_code, &state.visual_code);
    }

    // Invariant 7: a blank chat message in the ask step routes back to ask
    #[test]
    fn prop_blank_chat_in_ask_stays_in_ask(
        state in arb_state(),
        blank in "[ \t\n]{0,5}"
    ) {
        let mut state = state;
        state.current_step = Some(Step::Ask);
        let next = merge(&state, StateUpdate::user_message(blank));
        prop_assert_eq!(route(&next), Node::Ask);
    }
}
