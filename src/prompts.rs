//! Prompt text and reply shapes for the thinking-partner persona
//!
//! Every collaborator call is sent the persona first, then one node-specific
//! instruction block. The reply shapes are JSON Schemas strict enough for
//! `OpenAI` structured outputs (all properties required, no extras).

use crate::llm::ResponseSchema;
use crate::state_machine::NodeType;
use serde_json::{json, Value};

/// Persona shared by every language-model call
pub const SYSTEM_PROMPT: &str = r"You are a Thinking Partner for beginners.

Persona:
- Empathetic, patient, mentor-like.
- You help translate ideas into clear logic BEFORE coding.

Rules:
- Never write actual code (Python/JS/etc).
- Use analogies (cooking, lego, traffic lights) to explain.
- Keep steps plain language like a recipe.
";

/// Fixed opener emitted by the ask node
pub const ASK_MESSAGE: &str = "What kind of idea do you have? Tell me in one or two sentences.";

/// Re-prompt while waiting for a YES/NO
pub const CONFIRM_WAIT_MESSAGE: &str = "To continue, please confirm: YES or NO.";

/// Re-prompt once the graph exists
pub const COMPLETED_MESSAGE: &str =
    "Completed. If you want, start a new session to explore another idea.";

pub const INTERPRET_PROMPT: &str = r#"Given the user's idea, do the following:
1) Summarize the user's intention in 1-3 sentences (plan_context).
2) Provide a plain-language logical flow as steps A -> B -> C (proposed_logic). No code.
3) Write an assistant_message that says:
   - "I understood your idea as ..."
   - "To build this, we need steps ... Is this correct?"
Use a friendly, beginner-safe tone. Use analogies when helpful.
"#;

pub const REFINE_PROMPT: &str = r"The user said the proposed logic is NOT correct.
Use the user's feedback_text to ask 1-3 clarifying questions.
Do not write code. Use analogies if helpful.
End with a question so the user can answer next.
";

pub const GENERATE_PROMPT: &str = r"Convert the agreed logic into a Node-Edge graph for React Flow.

Requirements:
- Return ONLY valid JSON that matches the provided schema.
- Node.type must be one of: Trigger, Action, Condition, UI
- Node.label is short; Node.description explains in plain language.
- Keep ids simple and stable (e.g., n1, n2, n3).
- Edges should represent the flow.

Use plan_context and proposed_logic as the source of truth.
";

/// Context message placed ahead of the history for the refine node.
/// Missing or blank values render as `(none)`.
pub fn refine_context(proposed_logic: Option<&str>, feedback_text: Option<&str>) -> String {
    let or_none = |value: Option<&str>| {
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("(none)")
            .to_string()
    };
    format!(
        "Current proposed_logic:\n{}\n\nUser feedback_text:\n{}",
        or_none(proposed_logic),
        or_none(feedback_text)
    )
}

/// Context message placed ahead of the history for the generate node
pub fn generate_context(plan_context: &str, proposed_logic: &str) -> String {
    format!("plan_context:\n{plan_context}\n\nproposed_logic:\n{proposed_logic}")
}

fn string_property(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

pub fn interpret_shape() -> ResponseSchema {
    ResponseSchema::new(
        "interpret_output",
        "Interpretation of the user's idea, awaiting confirmation",
        object(json!({
            "plan_context": string_property("1-3 sentence summary of user intent."),
            "proposed_logic": string_property("Plain-language steps like A -> B -> C. No code."),
            "assistant_message": string_property("Friendly message that asks user to confirm the steps."),
        })),
    )
}

pub fn refine_shape() -> ResponseSchema {
    ResponseSchema::new(
        "refine_output",
        "Clarifying questions after the user rejected the proposed logic",
        object(json!({
            "assistant_message": string_property("1-3 clarifying questions, ends with a question."),
        })),
    )
}

pub fn visual_code_shape() -> ResponseSchema {
    let node_types: Vec<&str> = NodeType::ALL.iter().map(|t| t.as_str()).collect();
    let node = object(json!({
        "id": string_property("Stable id such as n1."),
        "type": { "type": "string", "enum": node_types },
        "label": string_property("Short label."),
        "description": string_property("Plain-language explanation."),
    }));
    let edge = object(json!({
        "source": string_property("Id of the node the flow leaves."),
        "target": string_property("Id of the node the flow enters."),
    }));

    ResponseSchema::new(
        "visual_code",
        "Node-edge flow chart of the agreed logic",
        object(json!({
            "nodes": { "type": "array", "items": node },
            "edges": { "type": "array", "items": edge },
            "summary": string_property("One or two sentences describing the flow."),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(schema: &Value) -> Vec<String> {
        let mut fields: Vec<String> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        fields.sort();
        fields
    }

    #[test]
    fn test_interpret_shape_requires_three_fields() {
        let shape = interpret_shape();
        assert_eq!(
            required(&shape.schema),
            vec!["assistant_message", "plan_context", "proposed_logic"]
        );
        assert_eq!(shape.schema["additionalProperties"], false);
    }

    #[test]
    fn test_visual_code_shape_enumerates_node_types() {
        let shape = visual_code_shape();
        let node = &shape.schema["properties"]["nodes"]["items"];
        assert_eq!(
            node["properties"]["type"]["enum"],
            json!(["Trigger", "Action", "Condition", "UI"])
        );
        assert_eq!(required(node), vec!["description", "id", "label", "type"]);
        assert_eq!(required(&shape.schema), vec!["edges", "nodes", "summary"]);
    }

    #[test]
    fn test_refine_context_placeholders() {
        assert_eq!(
            refine_context(None, None),
            "Current proposed_logic:\n(none)\n\nUser feedback_text:\n(none)"
        );
        assert!(refine_context(Some("A -> B"), Some("wrong trigger")).ends_with("wrong trigger"));
    }

    #[test]
    fn test_refine_context_blank_feedback_is_none() {
        assert_eq!(
            refine_context(Some("A -> B"), Some("")),
            "Current proposed_logic:\nA -> B\n\nUser feedback_text:\n(none)"
        );
        assert!(refine_context(Some("  "), Some("\n")).starts_with("Current proposed_logic:\n(none)"));
    }

    #[test]
    fn test_generate_context_layout() {
        assert_eq!(
            generate_context("a timer", "Start -> Ring"),
            "plan_context:\na timer\n\nproposed_logic:\nStart -> Ring"
        );
    }
}
