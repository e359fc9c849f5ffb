//! Simple reconstruction from top-level trace input/output.

use serde::Serialize;
use serde_json::Value;

use crate::observability::SessionEvent;
use crate::session::Role;
use crate::trace::Trace;

use super::extract::extract_logged;
use super::message::{ConversationMessage, reindex};

/// A trace output that transferred control to another agent instead of answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handoff {
    pub trace_id: String,
    pub from_agent: Option<String>,
    pub to_agent: Option<String>,
}

/// Result of trace-summary reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSummaryHistory {
    pub messages: Vec<ConversationMessage>,
    pub handoffs: Vec<Handoff>,
}

fn handoff_from(trace: &Trace) -> Option<Handoff> {
    let object = trace.output.as_ref()?.as_object()?;
    if !object.contains_key("handoff") && !object.contains_key("transfer") {
        return None;
    }
    Some(Handoff {
        trace_id: trace.id.clone(),
        from_agent: trace.name.clone(),
        to_agent: object
            .get("handoff_to")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// One user/assistant pair per trace, oldest trace first.
///
/// Hand-off outputs produce no assistant message; they are returned separately.
/// The trace name is kept as the assistant message's agent.
#[must_use]
pub fn reconstruct_from_traces(traces: &[Trace]) -> TraceSummaryHistory {
    let mut sorted: Vec<&Trace> = traces.iter().collect();
    sorted.sort_by_key(|trace| trace.timestamp);

    let mut history = TraceSummaryHistory::default();
    for trace in sorted {
        if let Some(text) = extract_logged(trace.input.as_ref(), &trace.id, "trace_input") {
            history
                .messages
                .push(ConversationMessage::new(Role::User, text));
        }
        if let Some(handoff) = handoff_from(trace) {
            tracing::debug!(
                event = SessionEvent::HistoryHandoffSkipped.as_str(),
                trace_id = %trace.id,
                from_agent = ?handoff.from_agent,
                to_agent = ?handoff.to_agent,
                "hand-off output skipped"
            );
            history.handoffs.push(handoff);
            continue;
        }
        if let Some(text) = extract_logged(trace.output.as_ref(), &trace.id, "trace_output") {
            history.messages.push(
                ConversationMessage::new(Role::Assistant, text).with_agent(trace.name.clone()),
            );
        }
    }
    reindex(&mut history.messages);
    history
}
