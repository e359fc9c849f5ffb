use serde_json::json;

use omni_resume::{
    HistoryReconstructor, RuntimeSettings, check_alternation, format_transcript,
};

use crate::cli::HistoryMode;
use crate::components::{build_fetcher, reconstruction_mode};

pub(crate) async fn run_history_mode(
    session_id: &str,
    mode: HistoryMode,
    max_pages: Option<usize>,
    as_json: bool,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let fetcher = build_fetcher(runtime_settings);
    let mode = reconstruction_mode(mode, max_pages, &fetcher);
    let reconstruction = HistoryReconstructor::new(fetcher)
        .reconstruct(session_id, mode)
        .await;
    let repeated_roles = check_alternation(&reconstruction.messages);

    if as_json {
        let body = json!({
            "session_id": session_id,
            "mode": mode.as_str(),
            "messages": reconstruction.messages,
            "repeated_roles": repeated_roles,
            "diagnostics": reconstruction.diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if reconstruction.messages.is_empty() {
        println!("No conversation found for session {session_id}.");
    } else {
        print!("{}", format_transcript(&reconstruction.messages));
        if repeated_roles.is_empty() {
            println!("Roles alternate correctly.");
        } else {
            println!("Repeated roles at positions: {repeated_roles:?}");
        }
    }
    for error in &reconstruction.diagnostics.errors {
        eprintln!("trace fetch problem: {error}");
    }
    Ok(())
}
