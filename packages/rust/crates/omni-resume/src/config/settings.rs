//! YAML runtime settings, layered system then user.
//!
//! - system: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - user:   `<PRJ_CONFIG_HOME>/omni-dev-fusion/settings.yaml` (`--conf` replaces the config home)
//!
//! A missing layer contributes nothing; an unreadable or invalid one is logged and skipped.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

const SYSTEM_SETTINGS_FILE: &str = "packages/conf/settings.yaml";
const USER_SETTINGS_FILE: &str = "omni-dev-fusion/settings.yaml";
const FALLBACK_CONFIG_HOME: &str = ".config";

static CONFIG_HOME: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub session: SessionSettings,
    pub traces: TraceSettings,
}

/// `session:` section, consumed by the session store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    pub valkey_url: Option<String>,
    pub key_prefix: Option<String>,
    pub ttl_secs: Option<u64>,
}

/// `traces:` section, consumed by the trace fetcher.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceSettings {
    pub host: Option<String>,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_pages: Option<usize>,
}

/// Field-wise overlay: values set in `upper` replace those in `self`.
trait Layer {
    fn layered_under(self, upper: Self) -> Self;
}

impl Layer for RuntimeSettings {
    fn layered_under(self, upper: Self) -> Self {
        Self {
            session: self.session.layered_under(upper.session),
            traces: self.traces.layered_under(upper.traces),
        }
    }
}

impl Layer for SessionSettings {
    fn layered_under(self, upper: Self) -> Self {
        Self {
            valkey_url: upper.valkey_url.or(self.valkey_url),
            key_prefix: upper.key_prefix.or(self.key_prefix),
            ttl_secs: upper.ttl_secs.or(self.ttl_secs),
        }
    }
}

impl Layer for TraceSettings {
    fn layered_under(self, upper: Self) -> Self {
        Self {
            host: upper.host.or(self.host),
            public_key: upper.public_key.or(self.public_key),
            secret_key: upper.secret_key.or(self.secret_key),
            timeout_secs: upper.timeout_secs.or(self.timeout_secs),
            max_pages: upper.max_pages.or(self.max_pages),
        }
    }
}

/// Settings from the discovered system and user files.
#[must_use]
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system, user) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system, &user)
}

/// `(system, user)` settings file locations.
#[doc(hidden)]
#[must_use]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = env_path("PRJ_ROOT")
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config_home = CONFIG_HOME
        .get()
        .cloned()
        .or_else(|| env_path("PRJ_CONFIG_HOME"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CONFIG_HOME));
    (
        root.join(SYSTEM_SETTINGS_FILE),
        root.join(config_home).join(USER_SETTINGS_FILE),
    )
}

#[doc(hidden)]
#[must_use]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    [system, user]
        .into_iter()
        .filter_map(|path| match read_layer(path) {
            Ok(layer) => layer,
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{error:#}"),
                    "ignoring settings file"
                );
                None
            }
        })
        .fold(RuntimeSettings::default(), Layer::layered_under)
}

/// Replace the config home (CLI `--conf`); relative paths resolve against `PRJ_ROOT`.
///
/// Only the first call takes effect.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if let Err(ignored) = CONFIG_HOME.set(path) {
        tracing::warn!(
            ignored = %ignored.display(),
            "config home already set; ignoring later override"
        );
    }
}

fn read_layer(path: &Path) -> Result<Option<RuntimeSettings>> {
    if !path.is_file() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings = serde_yaml::from_str(&raw)
        .with_context(|| format!("invalid settings yaml in {}", path.display()))?;
    Ok(Some(settings))
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
