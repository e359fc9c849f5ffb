//! Session store: session_id → ordered, TTL-bound list of items.
//!
//! Valkey-backed when a store URL is configured, in-memory otherwise. Both backends
//! share the same ordering and TTL semantics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::observability::SessionEvent;

use super::item::SessionItem;
use super::redis_backend::RedisSessionBackend;

pub const DEFAULT_SESSION_KEY_PREFIX: &str = "omni-resume:session";
/// Seven days.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 604_800;
/// Cap on in-memory deadlines (about a century); larger values overflow `Instant`.
const MAX_MEMORY_TTL_SECS: u64 = 100 * 365 * 86_400;

/// Injected store configuration (resolved by the bootstrap layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStoreConfig {
    /// Valkey/Redis URL; `None` selects the in-memory backend.
    pub url: Option<String>,
    pub key_prefix: String,
    /// Default TTL applied on every append.
    pub ttl_secs: u64,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            key_prefix: DEFAULT_SESSION_KEY_PREFIX.to_string(),
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

/// Snapshot returned by [`SessionStore::get_session_info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub item_count: usize,
    pub ttl_seconds: Option<u64>,
    pub exists: bool,
}

#[derive(Debug, Default)]
struct MemorySession {
    items: Vec<SessionItem>,
    expires_at: Option<Instant>,
}

impl MemorySession {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }

    fn deadline(now: Instant, ttl_secs: u64) -> Option<Instant> {
        now.checked_add(Duration::from_secs(ttl_secs.min(MAX_MEMORY_TTL_SECS)))
    }

    fn remaining_ttl_secs(&self, now: Instant) -> Option<u64> {
        let remaining = self.expires_at?.checked_duration_since(now)?;
        let secs = remaining.as_millis().div_ceil(1000);
        u64::try_from(secs).ok().filter(|value| *value > 0)
    }
}

type MemorySessions = HashMap<String, MemorySession>;

/// Drop the entry if its deadline has passed; mirrors key expiry in Valkey.
fn purge_expired(sessions: &mut MemorySessions, session_id: &str, now: Instant) {
    if sessions
        .get(session_id)
        .is_some_and(|session| session.is_expired(now))
    {
        sessions.remove(session_id);
    }
}

/// Ordered, append-only, TTL-bound store of conversation items.
pub struct SessionStore {
    inner: Arc<RwLock<MemorySessions>>,
    redis: Option<Arc<RedisSessionBackend>>,
    ttl_secs: u64,
}

impl SessionStore {
    /// Create a store from injected configuration.
    ///
    /// # Errors
    /// Returns an error when the configured store URL cannot be parsed.
    pub fn new(config: SessionStoreConfig) -> Result<Self> {
        let ttl_secs = if config.ttl_secs > 0 {
            config.ttl_secs
        } else {
            DEFAULT_SESSION_TTL_SECS
        };
        let redis = match config.url.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(url) => {
                let backend = RedisSessionBackend::new(url, config.key_prefix)
                    .context("failed to initialize valkey session store")?;
                tracing::info!(
                    event = SessionEvent::SessionBackendEnabled.as_str(),
                    key_prefix = %backend.key_prefix(),
                    ttl_secs,
                    "session store backend enabled: valkey"
                );
                Some(Arc::new(backend))
            }
            None => None,
        };
        Ok(Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            redis,
            ttl_secs,
        })
    }

    /// In-memory store with the given default TTL.
    #[must_use]
    pub fn in_memory(ttl_secs: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            redis: None,
            ttl_secs: if ttl_secs > 0 {
                ttl_secs
            } else {
                DEFAULT_SESSION_TTL_SECS
            },
        }
    }

    #[must_use]
    pub fn default_ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        if self.redis.is_some() {
            "valkey"
        } else {
            "memory"
        }
    }

    /// Append items to the tail of the session and refresh its TTL.
    ///
    /// Empty input is a no-op.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn add_items(&self, session_id: &str, items: Vec<SessionItem>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        if let Some(ref redis) = self.redis {
            redis
                .append_items(session_id, &items, self.ttl_secs)
                .await
                .with_context(|| {
                    format!("valkey session append failed for session_id={session_id}")
                })?;
            return Ok(());
        }
        let now = Instant::now();
        let mut g = self.inner.write().await;
        g.retain(|_, session| !session.is_expired(now));
        let entry = g.entry(session_id.to_string()).or_default();
        entry.items.extend(items);
        entry.expires_at = MemorySession::deadline(now, self.ttl_secs);
        tracing::debug!(
            event = SessionEvent::SessionItemsAppended.as_str(),
            session_id,
            total_items = entry.items.len(),
            backend = "memory",
            "session items appended"
        );
        Ok(())
    }

    /// All items in insertion order, or the most recent `limit` items (still chronological).
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn get_items(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SessionItem>> {
        if let Some(ref redis) = self.redis {
            return redis
                .get_items(session_id, limit)
                .await
                .with_context(|| {
                    format!("valkey session read failed for session_id={session_id}")
                });
        }
        let now = Instant::now();
        let g = self.inner.read().await;
        let items = match g.get(session_id).filter(|s| !s.is_expired(now)) {
            Some(session) => {
                let skip = limit.map_or(0, |limit| session.items.len().saturating_sub(limit));
                session.items[skip..].to_vec()
            }
            None => Vec::new(),
        };
        tracing::debug!(
            event = SessionEvent::SessionItemsLoaded.as_str(),
            session_id,
            requested_limit = ?limit,
            loaded_items = items.len(),
            backend = "memory",
            "session items loaded"
        );
        Ok(items)
    }

    /// Remove and return the most recently added item; `None` when the session is empty.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn pop_item(&self, session_id: &str) -> Result<Option<SessionItem>> {
        let popped = if let Some(ref redis) = self.redis {
            redis.pop_item(session_id).await.with_context(|| {
                format!("valkey session pop failed for session_id={session_id}")
            })?
        } else {
            let now = Instant::now();
            let mut g = self.inner.write().await;
            purge_expired(&mut g, session_id, now);
            let popped = g.get_mut(session_id).and_then(|session| session.items.pop());
            if g.get(session_id).is_some_and(|session| session.items.is_empty()) {
                g.remove(session_id);
            }
            popped
        };
        tracing::debug!(
            event = SessionEvent::SessionItemPopped.as_str(),
            session_id,
            found = popped.is_some(),
            backend = self.backend_name(),
            "session item pop"
        );
        Ok(popped)
    }

    /// Delete every item of the session.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn clear_session(&self, session_id: &str) -> Result<()> {
        if let Some(ref redis) = self.redis {
            redis.clear(session_id).await.with_context(|| {
                format!("valkey session clear failed for session_id={session_id}")
            })?;
        } else {
            self.inner.write().await.remove(session_id);
        }
        tracing::debug!(
            event = SessionEvent::SessionItemsCleared.as_str(),
            session_id,
            backend = self.backend_name(),
            "session items cleared"
        );
        Ok(())
    }

    /// Whether the session currently holds at least one item.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn exists(&self, session_id: &str) -> Result<bool> {
        Ok(self.item_count(session_id).await? > 0)
    }

    async fn item_count(&self, session_id: &str) -> Result<usize> {
        if let Some(ref redis) = self.redis {
            return redis.len(session_id).await.with_context(|| {
                format!("valkey session length read failed for session_id={session_id}")
            });
        }
        let now = Instant::now();
        let g = self.inner.read().await;
        Ok(g.get(session_id)
            .filter(|session| !session.is_expired(now))
            .map_or(0, |session| session.items.len()))
    }

    /// Item count, remaining TTL and existence flag.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn get_session_info(&self, session_id: &str) -> Result<SessionInfo> {
        let (item_count, ttl_seconds) = if let Some(ref redis) = self.redis {
            let count = redis.len(session_id).await.with_context(|| {
                format!("valkey session length read failed for session_id={session_id}")
            })?;
            let ttl = redis.ttl(session_id).await.with_context(|| {
                format!("valkey session ttl read failed for session_id={session_id}")
            })?;
            (count, ttl)
        } else {
            let now = Instant::now();
            let g = self.inner.read().await;
            g.get(session_id)
                .filter(|session| !session.is_expired(now))
                .map_or((0, None), |session| {
                    (session.items.len(), session.remaining_ttl_secs(now))
                })
        };
        let info = SessionInfo {
            session_id: session_id.to_string(),
            item_count,
            ttl_seconds,
            exists: item_count > 0,
        };
        tracing::debug!(
            event = SessionEvent::SessionInfoLoaded.as_str(),
            session_id,
            item_count,
            ttl_seconds = ?ttl_seconds,
            backend = self.backend_name(),
            "session info loaded"
        );
        Ok(info)
    }

    /// Refresh the TTL to `seconds` (or the default) when the session exists.
    ///
    /// Returns whether a TTL was applied.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn extend_ttl(&self, session_id: &str, seconds: Option<u64>) -> Result<bool> {
        let ttl_secs = seconds.filter(|v| *v > 0).unwrap_or(self.ttl_secs);
        let applied = if let Some(ref redis) = self.redis {
            redis.expire(session_id, ttl_secs).await.with_context(|| {
                format!("valkey session ttl refresh failed for session_id={session_id}")
            })?
        } else {
            let now = Instant::now();
            let mut g = self.inner.write().await;
            purge_expired(&mut g, session_id, now);
            match g.get_mut(session_id) {
                Some(session) if !session.items.is_empty() => {
                    session.expires_at = MemorySession::deadline(now, ttl_secs);
                    true
                }
                _ => false,
            }
        };
        let event = if applied {
            SessionEvent::SessionTtlExtended
        } else {
            SessionEvent::SessionTtlExtendSkipped
        };
        tracing::debug!(
            event = event.as_str(),
            session_id,
            ttl_secs,
            backend = self.backend_name(),
            "session ttl refresh"
        );
        Ok(applied)
    }

    /// Open a session for use; discards stored items unless `restore_existing`.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn prepare_session(
        &self,
        session_id: &str,
        restore_existing: bool,
    ) -> Result<SessionInfo> {
        if !restore_existing {
            self.clear_session(session_id).await?;
        }
        let info = self.get_session_info(session_id).await?;
        tracing::debug!(
            event = SessionEvent::SessionPrepared.as_str(),
            session_id,
            restore_existing,
            item_count = info.item_count,
            "session prepared"
        );
        Ok(info)
    }

    /// Drop the cached backend connection; later calls reconnect on demand.
    pub async fn close(&self) {
        if let Some(ref redis) = self.redis {
            redis.close().await;
        }
    }
}
