use std::sync::Arc;

use omni_resume::{
    HistoryReconstructor, RebuildOutcome, ReconstructionDiagnostics, RuntimeSettings,
    SessionRebuilder, SessionStore,
};

use crate::cli::HistoryMode;
use crate::components::{build_fetcher, build_store, preview, reconstruction_mode};

/// Exchanges shown after a successful resume (two user/assistant rounds).
const RECENT_MESSAGES_SHOWN: usize = 4;
const PREVIEW_CHARS: usize = 50;

/// Resume never fails the process: any error becomes a notice and a fresh session.
///
/// A session that still holds stored items is resumed as-is; trace history is only
/// consulted when the store has nothing (or `--fresh` cleared it).
pub(crate) async fn run_resume_mode(
    session_id: &str,
    mode: HistoryMode,
    max_pages: Option<usize>,
    fresh: bool,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let store = match build_store(runtime_settings) {
        Ok(store) => store,
        Err(error) => {
            println!("Could not open the session store ({error:#}); starting a fresh session.");
            return Ok(());
        }
    };
    if let Err(error) = resume(session_id, mode, max_pages, fresh, runtime_settings, &store).await {
        println!("Resume failed ({error:#}); starting a fresh session.");
    }
    store.close().await;
    Ok(())
}

async fn resume(
    session_id: &str,
    mode: HistoryMode,
    max_pages: Option<usize>,
    fresh: bool,
    runtime_settings: &RuntimeSettings,
    store: &Arc<SessionStore>,
) -> anyhow::Result<()> {
    let info = store.prepare_session(session_id, !fresh).await?;
    if info.exists {
        println!(
            "Resuming stored session {session_id} ({} item(s) in {}).",
            info.item_count,
            store.backend_name()
        );
        for item in store.get_items(session_id, Some(RECENT_MESSAGES_SHOWN)).await? {
            println!("  {}: {}", item.role, preview(&item.text(), PREVIEW_CHARS));
        }
        return Ok(());
    }

    let fetcher = build_fetcher(runtime_settings);
    let mode = reconstruction_mode(mode, max_pages, &fetcher);
    let rebuilder = SessionRebuilder::new(HistoryReconstructor::new(fetcher), Arc::clone(store));
    let outcome = rebuilder.rebuild(session_id, mode).await?;

    match &outcome {
        RebuildOutcome::Restored { messages, .. } => {
            println!(
                "Restored {} message(s) into session {session_id}.",
                messages.len()
            );
            let start = messages.len().saturating_sub(RECENT_MESSAGES_SHOWN);
            for message in &messages[start..] {
                println!("  {}: {}", message.role, preview(&message.content, PREVIEW_CHARS));
            }
        }
        RebuildOutcome::NoHistory { .. } => {
            println!("No previous conversation found for session {session_id}; starting fresh.");
        }
    }
    print_diagnostics(outcome.diagnostics());
    Ok(())
}

fn print_diagnostics(diagnostics: &ReconstructionDiagnostics) {
    for handoff in &diagnostics.handoffs {
        println!(
            "  hand-off: {} -> {}",
            handoff.from_agent.as_deref().unwrap_or("unknown"),
            handoff.to_agent.as_deref().unwrap_or("unknown")
        );
    }
    if diagnostics.malformed_skipped > 0 {
        println!(
            "  skipped {} malformed trace record(s)",
            diagnostics.malformed_skipped
        );
    }
    for error in &diagnostics.errors {
        println!("  trace fetch problem: {error}");
    }
}
