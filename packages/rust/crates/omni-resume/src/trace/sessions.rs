//! Group recent traces into per-session summaries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::record::Trace;

/// Activity summary of one session, derived from its traces.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub trace_count: usize,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    /// Input of the earliest trace, if any.
    pub first_input: Option<Value>,
}

/// Group traces by session id, newest `last_seen` first, truncated to `limit`.
///
/// Traces without a session id are ignored.
#[must_use]
pub fn summarize_sessions(traces: &[Trace], limit: usize) -> Vec<SessionSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut by_session: HashMap<String, SessionSummary> = HashMap::new();
    for trace in traces {
        let Some(session_id) = trace.session_id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        let summary = by_session.entry(session_id.to_string()).or_insert_with(|| {
            order.push(session_id.to_string());
            SessionSummary {
                session_id: session_id.to_string(),
                trace_count: 0,
                first_seen: trace.timestamp,
                last_seen: trace.timestamp,
                first_input: trace.input.clone(),
            }
        });
        summary.trace_count += 1;
        if summary.trace_count == 1 {
            continue;
        }
        if let Some(ts) = trace.timestamp {
            if summary.first_seen.is_none_or(|first| ts < first) {
                summary.first_seen = Some(ts);
                summary.first_input = trace.input.clone();
            }
            if summary.last_seen.is_none_or(|last| ts > last) {
                summary.last_seen = Some(ts);
            }
        }
    }

    let mut summaries: Vec<SessionSummary> = order
        .into_iter()
        .filter_map(|session_id| by_session.remove(&session_id))
        .collect();
    // Stable: sessions with equal activity keep API order; unknown timestamps go last.
    summaries.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
    summaries.truncate(limit);
    summaries
}
