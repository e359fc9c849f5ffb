//! Resolve component configs from settings files plus environment overrides.
//!
//! Environment wins over files; files win over built-in defaults.

use crate::session::SessionStoreConfig;
use crate::trace::TraceFetcherConfig;

use super::settings::RuntimeSettings;

const VALKEY_URL_ENV: &str = "VALKEY_URL";
const REDIS_URL_ENV: &str = "REDIS_URL";
const SESSION_PREFIX_ENV: &str = "OMNI_RESUME_SESSION_PREFIX";
const SESSION_TTL_ENV: &str = "REDIS_SESSION_TTL";
const TRACE_HOST_ENV: &str = "LANGFUSE_HOST";
const TRACE_PUBLIC_KEY_ENV: &str = "LANGFUSE_PUBLIC_KEY";
const TRACE_SECRET_KEY_ENV: &str = "LANGFUSE_SECRET_KEY";

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty_ref(value: Option<&str>) -> Option<String> {
    non_empty(value.map(str::to_string))
}

fn parse_positive_u64<F>(env: &F, name: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(env(name))?;
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(
                env_var = name,
                value = %raw,
                "invalid positive integer env value; using settings/default"
            );
            None
        }
    }
}

/// Session store config from settings and the process environment.
#[must_use]
pub fn resolve_session_store_config(settings: &RuntimeSettings) -> SessionStoreConfig {
    resolve_session_store_config_with(settings, process_env)
}

/// Session store config with an injectable environment lookup.
#[must_use]
pub fn resolve_session_store_config_with<F>(
    settings: &RuntimeSettings,
    env: F,
) -> SessionStoreConfig
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = SessionStoreConfig::default();
    let url = non_empty(env(VALKEY_URL_ENV))
        .or_else(|| non_empty(env(REDIS_URL_ENV)))
        .or_else(|| non_empty_ref(settings.session.valkey_url.as_deref()));
    let key_prefix = non_empty(env(SESSION_PREFIX_ENV))
        .or_else(|| non_empty_ref(settings.session.key_prefix.as_deref()))
        .unwrap_or(defaults.key_prefix);
    let ttl_secs = parse_positive_u64(&env, SESSION_TTL_ENV)
        .or_else(|| settings.session.ttl_secs.filter(|v| *v > 0))
        .unwrap_or(defaults.ttl_secs);
    SessionStoreConfig {
        url,
        key_prefix,
        ttl_secs,
    }
}

/// Trace fetcher config from settings and the process environment.
#[must_use]
pub fn resolve_trace_fetcher_config(settings: &RuntimeSettings) -> TraceFetcherConfig {
    resolve_trace_fetcher_config_with(settings, process_env)
}

/// Trace fetcher config with an injectable environment lookup.
#[must_use]
pub fn resolve_trace_fetcher_config_with<F>(
    settings: &RuntimeSettings,
    env: F,
) -> TraceFetcherConfig
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = TraceFetcherConfig::default();
    let traces = &settings.traces;
    TraceFetcherConfig {
        host: non_empty(env(TRACE_HOST_ENV))
            .or_else(|| non_empty_ref(traces.host.as_deref()))
            .unwrap_or(defaults.host),
        public_key: non_empty(env(TRACE_PUBLIC_KEY_ENV))
            .or_else(|| non_empty_ref(traces.public_key.as_deref())),
        secret_key: non_empty(env(TRACE_SECRET_KEY_ENV))
            .or_else(|| non_empty_ref(traces.secret_key.as_deref())),
        timeout_secs: traces
            .timeout_secs
            .filter(|v| *v > 0)
            .unwrap_or(defaults.timeout_secs),
        page_size: defaults.page_size,
        max_pages: traces
            .max_pages
            .filter(|v| *v > 0)
            .unwrap_or(defaults.max_pages),
    }
}
