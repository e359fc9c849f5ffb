//! In-memory trace source shared by reconstruction and rebuild tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use omni_resume::{FetchError, Fetched, Observation, Trace, TraceSource};
use serde_json::{Value, json};

/// Serves fixed traces and observations; paginates session observations by `page_size`.
pub struct FixtureSource {
    pub traces: Vec<Trace>,
    pub observations: Vec<Observation>,
    pub page_size: usize,
    pub trace_error: Option<FetchError>,
    pub page_requests: AtomicUsize,
}

impl FixtureSource {
    pub fn new(traces: Vec<Value>, observations: Vec<Value>) -> Self {
        Self {
            traces: traces
                .iter()
                .filter_map(|value| Trace::from_value(value).ok())
                .collect(),
            observations: observations
                .iter()
                .filter_map(|value| Observation::from_value(value).ok())
                .collect(),
            page_size: 2,
            trace_error: None,
            page_requests: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

#[async_trait]
impl TraceSource for FixtureSource {
    async fn session_traces(&self, session_id: &str) -> Fetched<Trace> {
        if let Some(error) = &self.trace_error {
            return Fetched::failed(error.clone());
        }
        let records = self
            .traces
            .iter()
            .filter(|trace| trace.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect();
        Fetched::ok(records, 0)
    }

    async fn observations(&self, trace_id: &str) -> Fetched<Observation> {
        let records = self
            .observations
            .iter()
            .filter(|observation| observation.trace_id == trace_id)
            .cloned()
            .collect();
        Fetched::ok(records, 0)
    }

    async fn session_observations_paginated(
        &self,
        _session_id: &str,
        max_pages: usize,
    ) -> Fetched<Observation> {
        let mut records = Vec::new();
        for chunk in self.observations.chunks(self.page_size).take(max_pages) {
            self.page_requests.fetch_add(1, Ordering::Relaxed);
            records.extend(chunk.iter().cloned());
        }
        Fetched::ok(records, 0)
    }
}

pub fn trace(id: &str, session_id: &str, timestamp: &str) -> Value {
    json!({"id": id, "sessionId": session_id, "timestamp": timestamp, "name": "Assistant"})
}

pub fn user_span(id: &str, trace_id: &str, start: &str, input: Value) -> Value {
    json!({
        "id": id,
        "traceId": trace_id,
        "type": "SPAN",
        "name": "user-interaction",
        "startTime": start,
        "input": input
    })
}

pub fn generation(id: &str, trace_id: &str, start: &str, input: Value, output: Value) -> Value {
    json!({
        "id": id,
        "traceId": trace_id,
        "type": "GENERATION",
        "name": "response",
        "startTime": start,
        "input": input,
        "output": output
    })
}

/// Two rounds: `hello` / `hi there`, then `bye` / `goodbye`.
pub fn two_round_session(session_id: &str) -> FixtureSource {
    FixtureSource::new(
        vec![
            trace("t2", session_id, "2025-01-01T00:01:00Z"),
            trace("t1", session_id, "2025-01-01T00:00:00Z"),
        ],
        vec![
            user_span("s1", "t1", "2025-01-01T00:00:00Z", json!("hello")),
            generation(
                "g1",
                "t1",
                "2025-01-01T00:00:01Z",
                json!([{"role": "user", "content": "hello"}]),
                json!("hi there"),
            ),
            user_span("s2", "t2", "2025-01-01T00:01:00Z", json!({"query": "bye"})),
            generation(
                "g2",
                "t2",
                "2025-01-01T00:01:01Z",
                json!([
                    {"role": "user", "content": "hello"},
                    {"role": "assistant", "content": "hi there"},
                    {"role": "user", "content": "bye"}
                ]),
                json!([{"type": "output_text", "text": "goodbye"}]),
            ),
        ],
    )
}
