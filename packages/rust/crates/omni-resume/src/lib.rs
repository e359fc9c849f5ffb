//! Session persistence and conversation resume.
//!
//! - **Session store**: ordered, TTL-bound conversation items in Valkey (or in memory).
//! - **Trace fetcher**: read-only client over the trace/observation API.
//! - **History reconstruction**: ordered user/assistant messages derived from traces.
//! - **Rebuild**: reconstructed history written back into the session store.

#![allow(missing_docs)]

mod config;
mod history;
mod observability;
mod rebuild;
mod session;
mod trace;

pub use config::{
    RuntimeSettings, SessionSettings, TraceSettings, load_runtime_settings,
    load_runtime_settings_from_paths, resolve_session_store_config,
    resolve_session_store_config_with, resolve_trace_fetcher_config,
    resolve_trace_fetcher_config_with, runtime_settings_paths, set_config_home_override,
};
pub use history::{
    ConversationMessage, Extracted, ExtractionStrategy, GenerationHistory, Handoff,
    HistoryReconstructor, Reconstruction, ReconstructionDiagnostics, ReconstructionMode,
    TraceSummaryHistory, check_alternation, extract_text, format_transcript,
    reconstruct_from_generation_histories, reconstruct_from_observations,
    reconstruct_from_traces,
};
pub use observability::SessionEvent;
pub use rebuild::{AGENT_NAME_METADATA_KEY, RebuildOutcome, SessionRebuilder, messages_to_items};
pub use session::{
    ContentBlock, DEFAULT_SESSION_KEY_PREFIX, DEFAULT_SESSION_TTL_SECS, ItemContent,
    OUTPUT_TEXT_BLOCK_TYPE, Role, SessionInfo, SessionItem, SessionStore, SessionStoreConfig,
};
pub use trace::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_TRACE_HOST, FetchError, Fetched, Observation,
    ObservationBody, RecordError, SessionSummary, Trace, TraceFetcher, TraceFetcherConfig,
    TraceSource, USER_INTERACTION_SPAN, summarize_sessions,
};
