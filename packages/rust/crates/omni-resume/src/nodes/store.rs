use omni_resume::RuntimeSettings;

use crate::components::build_store;

pub(crate) async fn run_info_mode(
    session_id: &str,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let store = build_store(runtime_settings)?;
    let info = store.get_session_info(session_id).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    store.close().await;
    Ok(())
}

pub(crate) async fn run_clear_mode(
    session_id: &str,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let store = build_store(runtime_settings)?;
    store.clear_session(session_id).await?;
    println!("Cleared session {session_id} ({}).", store.backend_name());
    store.close().await;
    Ok(())
}
