//! Session history reconstruction from trace data, with per-run diagnostics.

use std::sync::Arc;

use serde::Serialize;

use crate::observability::SessionEvent;
use crate::trace::{DEFAULT_MAX_PAGES, FetchError, Fetched, Observation, Trace, TraceSource};

use super::generations::reconstruct_from_generation_histories;
use super::message::ConversationMessage;
use super::observations::reconstruct_from_observations;
use super::traces::{Handoff, reconstruct_from_traces};

/// Which trace data drives reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconstructionMode {
    /// Session traces, then each trace's observations.
    #[default]
    PerTrace,
    /// Paginated session-scoped observations.
    SessionScoped { max_pages: usize },
    /// Per-trace observations, read through generation message arrays.
    GenerationHistory,
    /// Top-level trace input/output only.
    TraceSummary,
}

impl ReconstructionMode {
    /// Session-scoped mode with the default page budget.
    #[must_use]
    pub const fn session_scoped() -> Self {
        Self::SessionScoped {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerTrace => "per_trace",
            Self::SessionScoped { .. } => "session_scoped",
            Self::GenerationHistory => "generation_history",
            Self::TraceSummary => "trace_summary",
        }
    }
}

/// What the fetch and reconstruction steps observed along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionDiagnostics {
    pub traces_seen: usize,
    pub observations_seen: usize,
    /// Malformed records dropped at the API boundary.
    pub malformed_skipped: usize,
    pub duplicates_dropped: usize,
    pub handoffs: Vec<Handoff>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<FetchError>,
}

impl ReconstructionDiagnostics {
    #[must_use]
    pub fn handoffs_skipped(&self) -> usize {
        self.handoffs.len()
    }

    fn absorb<T>(&mut self, fetched: Fetched<T>) -> Vec<T> {
        self.malformed_skipped += fetched.skipped;
        if let Some(error) = fetched.error {
            self.errors.push(error);
        }
        fetched.records
    }
}

fn serialize_errors<S>(errors: &[FetchError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Reconstructed messages plus diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstruction {
    pub messages: Vec<ConversationMessage>,
    pub diagnostics: ReconstructionDiagnostics,
}

/// Derives an ordered conversation for a session from an injected [`TraceSource`].
#[derive(Clone)]
pub struct HistoryReconstructor {
    source: Arc<dyn TraceSource>,
}

impl HistoryReconstructor {
    #[must_use]
    pub fn new(source: Arc<dyn TraceSource>) -> Self {
        Self { source }
    }

    /// Reconstruct the conversation of `session_id`.
    ///
    /// Never fails: fetch problems leave an empty or partial result and are listed in
    /// the diagnostics.
    pub async fn reconstruct(&self, session_id: &str, mode: ReconstructionMode) -> Reconstruction {
        let mut diagnostics = ReconstructionDiagnostics::default();
        let messages = match mode {
            ReconstructionMode::PerTrace => {
                let observations = self.per_trace_observations(session_id, &mut diagnostics).await;
                reconstruct_from_observations(&observations)
            }
            ReconstructionMode::SessionScoped { max_pages } => {
                let fetched = self
                    .source
                    .session_observations_paginated(session_id, max_pages)
                    .await;
                let observations = diagnostics.absorb(fetched);
                diagnostics.observations_seen = observations.len();
                reconstruct_from_observations(&observations)
            }
            ReconstructionMode::GenerationHistory => {
                let observations = self.per_trace_observations(session_id, &mut diagnostics).await;
                let history = reconstruct_from_generation_histories(&observations);
                diagnostics.duplicates_dropped = history.duplicates_dropped;
                history.messages
            }
            ReconstructionMode::TraceSummary => {
                let traces = self.session_traces(session_id, &mut diagnostics).await;
                let history = reconstruct_from_traces(&traces);
                diagnostics.handoffs = history.handoffs;
                history.messages
            }
        };

        tracing::info!(
            event = SessionEvent::HistoryReconstructionCompleted.as_str(),
            session_id,
            mode = mode.as_str(),
            messages = messages.len(),
            traces_seen = diagnostics.traces_seen,
            observations_seen = diagnostics.observations_seen,
            malformed_skipped = diagnostics.malformed_skipped,
            duplicates_dropped = diagnostics.duplicates_dropped,
            handoffs_skipped = diagnostics.handoffs_skipped(),
            fetch_errors = diagnostics.errors.len(),
            "conversation history reconstructed"
        );
        Reconstruction {
            messages,
            diagnostics,
        }
    }

    async fn session_traces(
        &self,
        session_id: &str,
        diagnostics: &mut ReconstructionDiagnostics,
    ) -> Vec<Trace> {
        let traces = diagnostics.absorb(self.source.session_traces(session_id).await);
        diagnostics.traces_seen = traces.len();
        traces
    }

    async fn per_trace_observations(
        &self,
        session_id: &str,
        diagnostics: &mut ReconstructionDiagnostics,
    ) -> Vec<Observation> {
        let traces = self.session_traces(session_id, diagnostics).await;
        let mut observations = Vec::new();
        for trace in &traces {
            let fetched = self.source.observations(&trace.id).await;
            observations.extend(diagnostics.absorb(fetched));
        }
        diagnostics.observations_seen = observations.len();
        observations
    }
}
