//! Closed classifier for the recognized training-example shapes.
//!
//! Each shape has an explicit required-field contract and the shapes are
//! checked in a fixed priority order; anything else lands on
//! `Unrecognized` instead of falling through silently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleShape {
    /// `{"messages": [{"role": ..., "content": ...}, ...]}`
    Conversation,
    /// `{"instruction": ..., "output": ...}` with optional `input`.
    InstructionOutput,
    /// `{"prompt": ..., "chosen": ..., "rejected": ...}`
    PreferencePair,
    /// `{"text": ...}`
    FreeText,
    Unrecognized,
}

/// Outcome of classifying a single raw example.
///
/// `payload` is the concatenated textual content when the required fields
/// are present with the right types; `None` means the example is malformed
/// and contributes nothing to the token statistics.
#[derive(Debug, Clone)]
pub struct ClassifiedExample {
    pub shape: ExampleShape,
    pub payload: Option<String>,
    /// Turn roles, in order, for conversation-shaped examples.
    pub roles: Option<Vec<String>>,
}

impl ClassifiedExample {
    fn malformed(shape: ExampleShape) -> Self {
        Self { shape, payload: None, roles: None }
    }

    fn text(shape: ExampleShape, payload: String) -> Self {
        Self { shape, payload: Some(payload), roles: None }
    }
}

/// Classifies one raw example against the known shapes.
#[must_use]
pub fn classify(example: &Value) -> ClassifiedExample {
    let Some(obj) = example.as_object() else {
        return ClassifiedExample::malformed(ExampleShape::Unrecognized);
    };

    if obj.contains_key("messages") {
        return classify_conversation(example);
    }
    if obj.contains_key("instruction") && obj.contains_key("output") {
        let parts = [string_field(example, "instruction"), string_field(example, "input"), string_field(example, "output")];
        // `input` is optional; the other two are required.
        if parts[0].is_none() || parts[2].is_none() {
            return ClassifiedExample::malformed(ExampleShape::InstructionOutput);
        }
        return ClassifiedExample::text(ExampleShape::InstructionOutput, join_parts(&parts));
    }
    if obj.contains_key("prompt") && obj.contains_key("chosen") && obj.contains_key("rejected") {
        let parts = [string_field(example, "prompt"), string_field(example, "chosen"), string_field(example, "rejected")];
        if parts.iter().any(Option::is_none) {
            return ClassifiedExample::malformed(ExampleShape::PreferencePair);
        }
        return ClassifiedExample::text(ExampleShape::PreferencePair, join_parts(&parts));
    }
    if obj.contains_key("text") {
        return match string_field(example, "text") {
            Some(text) => ClassifiedExample::text(ExampleShape::FreeText, text),
            None => ClassifiedExample::malformed(ExampleShape::FreeText),
        };
    }

    ClassifiedExample::malformed(ExampleShape::Unrecognized)
}

fn classify_conversation(example: &Value) -> ClassifiedExample {
    let Some(messages) = example.get("messages").and_then(Value::as_array) else {
        return ClassifiedExample::malformed(ExampleShape::Conversation);
    };
    if messages.is_empty() {
        return ClassifiedExample::malformed(ExampleShape::Conversation);
    }

    let mut payload = String::new();
    let mut roles = Vec::with_capacity(messages.len());
    for message in messages {
        let (Some(role), Some(content)) =
            (string_field(message, "role"), string_field(message, "content"))
        else {
            return ClassifiedExample::malformed(ExampleShape::Conversation);
        };
        if !payload.is_empty() {
            payload.push('\n');
        }
        payload.push_str(content.trim());
        roles.push(role);
    }

    ClassifiedExample { shape: ExampleShape::Conversation, payload: Some(payload), roles: Some(roles) }
}

/// Checks that conversation turns strictly alternate between the asker and
/// the responder, allowing a single leading system turn.
#[must_use]
pub fn alternation_ok(roles: &[String]) -> bool {
    let turns: Vec<&str> = roles
        .iter()
        .map(String::as_str)
        .skip_while(|r| *r == "system")
        .collect();
    if turns.is_empty() {
        return false;
    }
    if turns[0] != "user" {
        return false;
    }
    for (idx, role) in turns.iter().enumerate() {
        let expected = if idx % 2 == 0 { "user" } else { "assistant" };
        if *role != expected {
            return false;
        }
    }
    true
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(|s| s.trim().to_string())
}

fn join_parts(parts: &[Option<String>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}
