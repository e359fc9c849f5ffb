//! Reconstruction behavior over fixed trace fixtures.

#![allow(missing_docs)]

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use omni_resume::{
    FetchError, HistoryReconstructor, ReconstructionMode, Role, check_alternation,
    format_transcript,
};
use serde_json::json;

use support::{FixtureSource, generation, trace, two_round_session, user_span};

fn pairs(messages: &[omni_resume::ConversationMessage]) -> Vec<(Role, String)> {
    messages
        .iter()
        .map(|message| (message.role, message.content.clone()))
        .collect()
}

fn expected_two_rounds() -> Vec<(Role, String)> {
    vec![
        (Role::User, "hello".to_string()),
        (Role::Assistant, "hi there".to_string()),
        (Role::User, "bye".to_string()),
        (Role::Assistant, "goodbye".to_string()),
    ]
}

#[tokio::test]
async fn per_trace_mode_yields_alternating_rounds() {
    let reconstructor = HistoryReconstructor::new(Arc::new(two_round_session("s1")));
    let reconstruction = reconstructor
        .reconstruct("s1", ReconstructionMode::PerTrace)
        .await;

    assert_eq!(pairs(&reconstruction.messages), expected_two_rounds());
    let indexes: Vec<usize> = reconstruction.messages.iter().map(|m| m.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3]);
    assert!(check_alternation(&reconstruction.messages).is_empty());
    assert_eq!(reconstruction.diagnostics.traces_seen, 2);
    assert_eq!(reconstruction.diagnostics.observations_seen, 4);
    assert!(reconstruction.diagnostics.errors.is_empty());
}

#[tokio::test]
async fn reconstruction_is_idempotent() {
    let reconstructor = HistoryReconstructor::new(Arc::new(two_round_session("s1")));
    let first = reconstructor
        .reconstruct("s1", ReconstructionMode::PerTrace)
        .await;
    let second = reconstructor
        .reconstruct("s1", ReconstructionMode::PerTrace)
        .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn session_scoped_mode_respects_page_budget() {
    let source = Arc::new(two_round_session("s1"));
    let reconstructor = HistoryReconstructor::new(source.clone());

    let all = reconstructor
        .reconstruct("s1", ReconstructionMode::session_scoped())
        .await;
    assert_eq!(pairs(&all.messages), expected_two_rounds());
    assert_eq!(source.page_requests.load(Ordering::Relaxed), 2);

    let first_page = reconstructor
        .reconstruct("s1", ReconstructionMode::SessionScoped { max_pages: 1 })
        .await;
    assert_eq!(
        pairs(&first_page.messages),
        vec![
            (Role::User, "hello".to_string()),
            (Role::Assistant, "hi there".to_string()),
        ]
    );
}

#[tokio::test]
async fn generation_history_mode_drops_repeated_context() {
    let reconstructor = HistoryReconstructor::new(Arc::new(two_round_session("s1")));
    let reconstruction = reconstructor
        .reconstruct("s1", ReconstructionMode::GenerationHistory)
        .await;
    assert_eq!(pairs(&reconstruction.messages), expected_two_rounds());
    assert_eq!(reconstruction.diagnostics.duplicates_dropped, 2);
}

#[tokio::test]
async fn growing_generation_outputs_collapse_to_the_last_one() {
    let source = FixtureSource::new(
        vec![trace("t1", "s1", "2025-01-01T00:00:00Z")],
        vec![
            user_span("u1", "t1", "2025-01-01T00:00:00Z", json!("question")),
            generation(
                "g1",
                "t1",
                "2025-01-01T00:00:01Z",
                json!(null),
                json!([{"role": "assistant", "content": "m1"}]),
            ),
            generation(
                "g2",
                "t1",
                "2025-01-01T00:00:02Z",
                json!(null),
                json!([
                    {"role": "assistant", "content": "m1"},
                    {"role": "assistant", "content": "m2"},
                    {"role": "assistant", "content": "m3"}
                ]),
            ),
        ],
    );
    let reconstruction = HistoryReconstructor::new(Arc::new(source))
        .reconstruct("s1", ReconstructionMode::PerTrace)
        .await;
    assert_eq!(
        pairs(&reconstruction.messages),
        vec![
            (Role::User, "question".to_string()),
            (Role::Assistant, "m3".to_string()),
        ]
    );
}

#[tokio::test]
async fn trace_summary_mode_skips_handoffs_and_keeps_agent_names() {
    let source = FixtureSource::new(
        vec![
            json!({
                "id": "t1", "sessionId": "s1", "name": "Triage Agent",
                "timestamp": "2025-01-01T00:00:00Z",
                "input": "I need tax advice",
                "output": {"transfer": true, "handoff_to": "Tax Expert"}
            }),
            json!({
                "id": "t2", "sessionId": "s1", "name": "Tax Expert",
                "timestamp": "2025-01-01T00:01:00Z",
                "input": {"message": "about deductions"},
                "output": {"response": "Here is what applies."}
            }),
        ],
        Vec::new(),
    );
    let reconstruction = HistoryReconstructor::new(Arc::new(source))
        .reconstruct("s1", ReconstructionMode::TraceSummary)
        .await;

    assert_eq!(
        pairs(&reconstruction.messages),
        vec![
            (Role::User, "I need tax advice".to_string()),
            (Role::User, "about deductions".to_string()),
            (Role::Assistant, "Here is what applies.".to_string()),
        ]
    );
    assert_eq!(
        reconstruction.messages[2].agent.as_deref(),
        Some("Tax Expert")
    );
    assert_eq!(reconstruction.diagnostics.handoffs_skipped(), 1);
    assert_eq!(check_alternation(&reconstruction.messages), vec![1]);
}

#[tokio::test]
async fn fetch_failures_surface_in_diagnostics_only() {
    let mut source = two_round_session("s1");
    source.trace_error = Some(FetchError::Connectivity("connection refused".to_string()));
    let reconstruction = HistoryReconstructor::new(Arc::new(source))
        .reconstruct("s1", ReconstructionMode::PerTrace)
        .await;
    assert!(reconstruction.messages.is_empty());
    assert_eq!(
        reconstruction.diagnostics.errors,
        vec![FetchError::Connectivity("connection refused".to_string())]
    );
}

#[tokio::test]
async fn unknown_session_reconstructs_to_nothing() {
    let reconstruction = HistoryReconstructor::new(Arc::new(FixtureSource::empty()))
        .reconstruct("missing", ReconstructionMode::PerTrace)
        .await;
    assert!(reconstruction.messages.is_empty());
    assert_eq!(format_transcript(&reconstruction.messages), "");
}
