use std::sync::Arc;

use anyhow::Result;

use omni_resume::{
    ReconstructionMode, RuntimeSettings, SessionStore, TraceFetcher,
    resolve_session_store_config, resolve_trace_fetcher_config,
};

use crate::cli::HistoryMode;

pub(crate) fn build_store(runtime_settings: &RuntimeSettings) -> Result<Arc<SessionStore>> {
    let config = resolve_session_store_config(runtime_settings);
    Ok(Arc::new(SessionStore::new(config)?))
}

pub(crate) fn build_fetcher(runtime_settings: &RuntimeSettings) -> Arc<TraceFetcher> {
    Arc::new(TraceFetcher::new(resolve_trace_fetcher_config(
        runtime_settings,
    )))
}

pub(crate) fn reconstruction_mode(
    mode: HistoryMode,
    max_pages: Option<usize>,
    fetcher: &TraceFetcher,
) -> ReconstructionMode {
    match mode {
        HistoryMode::PerTrace => ReconstructionMode::PerTrace,
        HistoryMode::Session => ReconstructionMode::SessionScoped {
            max_pages: max_pages.unwrap_or_else(|| fetcher.max_pages()),
        },
        HistoryMode::Generations => ReconstructionMode::GenerationHistory,
        HistoryMode::Traces => ReconstructionMode::TraceSummary,
    }
}

/// First `max_chars` characters, with an ellipsis when cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
