//! Trace namespace: read-only client over the external trace/observation API.
//!
//! Records are validated into typed shapes at the boundary; fetch failures degrade to
//! empty results with a diagnostic instead of failing the caller.

mod client;
mod error;
mod record;
mod sessions;
mod source;

pub use client::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_TRACE_HOST, Fetched, TraceFetcher,
    TraceFetcherConfig,
};
pub use error::{FetchError, RecordError};
pub use record::{Observation, ObservationBody, Trace, USER_INTERACTION_SPAN};
pub use sessions::{SessionSummary, summarize_sessions};
pub use source::TraceSource;
