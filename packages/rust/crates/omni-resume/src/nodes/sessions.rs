use omni_resume::{RuntimeSettings, extract_text};

use crate::components::{build_fetcher, preview};

const FIRST_INPUT_PREVIEW_CHARS: usize = 50;

pub(crate) async fn run_sessions_mode(
    limit: usize,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let fetcher = build_fetcher(runtime_settings);
    let fetched = fetcher.list_recent_sessions(limit).await;
    if let Some(error) = &fetched.error {
        eprintln!("trace fetch problem: {error}");
    }
    if fetched.records.is_empty() {
        println!("No recent sessions found.");
        return Ok(());
    }
    for summary in &fetched.records {
        let last_seen = summary
            .last_seen
            .map_or_else(|| "-".to_string(), |ts| ts.to_rfc3339());
        let first_input = summary
            .first_input
            .as_ref()
            .and_then(extract_text)
            .map(|extracted| preview(&extracted.text, FIRST_INPUT_PREVIEW_CHARS))
            .unwrap_or_default();
        println!(
            "{}\t{} trace(s)\tlast seen {}\t{}",
            summary.session_id, summary.trace_count, last_seen, first_input
        );
    }
    Ok(())
}
