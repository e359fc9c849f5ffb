//! Config namespace: runtime settings files and component config resolution.

mod resolve;
mod settings;

pub use resolve::{
    resolve_session_store_config, resolve_session_store_config_with,
    resolve_trace_fetcher_config, resolve_trace_fetcher_config_with,
};
pub use settings::{
    RuntimeSettings, SessionSettings, TraceSettings, load_runtime_settings,
    load_runtime_settings_from_paths, runtime_settings_paths, set_config_home_override,
};
