//! Fallback reconstruction from the message arrays carried by generations.

use std::collections::HashSet;

use serde_json::Value;

use crate::observability::SessionEvent;
use crate::session::Role;
use crate::trace::Observation;

use super::extract::{extract_logged, extract_nested};
use super::message::{ConversationMessage, reindex};
use super::observations::sorted_by_start;

/// Result of the generation-history fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationHistory {
    pub messages: Vec<ConversationMessage>,
    /// Entries removed by signature dedup or by the per-trace cap.
    pub duplicates_dropped: usize,
}

fn role_of(raw: &str) -> Option<Role> {
    match raw {
        "system" | "developer" => None,
        "user" => Some(Role::User),
        _ => Some(Role::Assistant),
    }
}

fn message_from(value: &Value) -> Option<ConversationMessage> {
    let object = value.as_object()?;
    let role = role_of(object.get("role")?.as_str()?)?;
    let text = extract_nested(object.get("content")?, 0)?;
    Some(ConversationMessage::new(role, text))
}

fn is_role_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key("role"))
}

/// Messages carried by a generation payload.
///
/// Arrays holding role objects are read as message lists; a single message object
/// counts as one message; any other payload is one message with `fallback_role`.
fn payload_messages(
    payload: Option<&Value>,
    record_id: &str,
    source: &'static str,
    fallback_role: Role,
) -> Vec<ConversationMessage> {
    match payload {
        Some(Value::Array(items)) if items.iter().any(is_role_object) => {
            items.iter().filter_map(message_from).collect()
        }
        Some(value) if is_role_object(value) => message_from(value).into_iter().collect(),
        other => extract_logged(other, record_id, source)
            .map(|text| ConversationMessage::new(fallback_role, text))
            .into_iter()
            .collect(),
    }
}

/// Rebuild the conversation from generation input/output message arrays.
///
/// Keeps the first occurrence of each (role, content) pair scanning oldest to newest,
/// then caps the result at the most recent `2 x distinct traces` entries.
#[must_use]
pub fn reconstruct_from_generation_histories(observations: &[Observation]) -> GenerationHistory {
    let distinct_traces: HashSet<&str> = observations
        .iter()
        .map(|observation| observation.trace_id.as_str())
        .collect();

    let mut seen: HashSet<(Role, String)> = HashSet::new();
    let mut messages = Vec::new();
    let mut duplicates_dropped = 0usize;

    for observation in sorted_by_start(observations) {
        if !observation.is_generation() {
            continue;
        }
        let candidates = payload_messages(
            observation.generation_input(),
            &observation.id,
            "generation_input",
            Role::User,
        )
        .into_iter()
        .chain(payload_messages(
            observation.generation_output(),
            &observation.id,
            "generation_output",
            Role::Assistant,
        ));
        for message in candidates {
            if seen.insert((message.role, message.content.clone())) {
                messages.push(message);
            } else {
                duplicates_dropped += 1;
            }
        }
    }

    let cap = distinct_traces.len().saturating_mul(2);
    if messages.len() > cap {
        let excess = messages.len() - cap;
        messages.drain(..excess);
        duplicates_dropped += excess;
    }
    reindex(&mut messages);

    if duplicates_dropped > 0 {
        tracing::debug!(
            event = SessionEvent::HistoryDedupApplied.as_str(),
            kept = messages.len(),
            duplicates_dropped,
            distinct_traces = distinct_traces.len(),
            "generation history deduplicated"
        );
    }
    GenerationHistory {
        messages,
        duplicates_dropped,
    }
}
