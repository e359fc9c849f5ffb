//! Seam between history reconstruction and the trace API.

use async_trait::async_trait;

use super::client::{Fetched, TraceFetcher};
use super::record::{Observation, Trace};

/// Read-only source of traces and observations.
///
/// Implementations never fail the caller: errors are reported in [`Fetched::error`].
#[async_trait]
pub trait TraceSource: Send + Sync {
    async fn session_traces(&self, session_id: &str) -> Fetched<Trace>;

    async fn observations(&self, trace_id: &str) -> Fetched<Observation>;

    async fn session_observations_paginated(
        &self,
        session_id: &str,
        max_pages: usize,
    ) -> Fetched<Observation>;
}

#[async_trait]
impl TraceSource for TraceFetcher {
    async fn session_traces(&self, session_id: &str) -> Fetched<Trace> {
        self.get_session_traces(session_id).await
    }

    async fn observations(&self, trace_id: &str) -> Fetched<Observation> {
        self.get_observations(trace_id).await
    }

    async fn session_observations_paginated(
        &self,
        session_id: &str,
        max_pages: usize,
    ) -> Fetched<Observation> {
        self.get_session_observations_paginated(session_id, max_pages)
            .await
    }
}
