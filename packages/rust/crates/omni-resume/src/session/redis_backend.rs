//! Redis/Valkey-backed session item persistence.
//!
//! One list per session (`<prefix>:items:<session_id>`), one JSON item per element.
//! Commands are not retried here; a failed command drops the cached connection so
//! the next call reconnects.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::FromRedisValue;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;

use crate::observability::SessionEvent;

use super::item::SessionItem;

/// A single command or a MULTI/EXEC pipeline.
enum Request {
    Single(redis::Cmd),
    Atomic(redis::Pipeline),
}

impl Request {
    fn key_command(name: &str, key: &str) -> Self {
        let mut cmd = redis::cmd(name);
        cmd.arg(key);
        Self::Single(cmd)
    }
}

#[derive(Debug)]
pub(crate) struct RedisSessionBackend {
    client: redis::Client,
    key_prefix: String,
    connection: Arc<Mutex<Option<MultiplexedConnection>>>,
}

impl RedisSessionBackend {
    pub(crate) fn new(url: &str, key_prefix: String) -> Result<Self> {
        let client = redis::Client::open(url)
            .with_context(|| format!("invalid valkey url for session store: {url}"))?;
        Ok(Self {
            client,
            key_prefix,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    pub(crate) fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn items_key(&self, session_id: &str) -> String {
        format!("{}:items:{session_id}", self.key_prefix)
    }

    async fn connected<'a>(
        &self,
        slot: &'a mut Option<MultiplexedConnection>,
    ) -> Result<&'a mut MultiplexedConnection> {
        if slot.is_none() {
            let conn = self
                .client
                .get_multiplexed_async_connection()
                .await
                .context("failed to connect to valkey for session store")?;
            *slot = Some(conn);
            tracing::debug!(
                event = SessionEvent::SessionValkeyConnected.as_str(),
                key_prefix = %self.key_prefix,
                "valkey session backend connected"
            );
        }
        slot.as_mut()
            .ok_or_else(|| anyhow::anyhow!("valkey session connection unavailable"))
    }

    async fn execute<T>(&self, operation: &'static str, request: Request) -> Result<T>
    where
        T: FromRedisValue + Send,
    {
        let mut slot = self.connection.lock().await;
        let conn = self.connected(&mut slot).await?;
        let result: redis::RedisResult<T> = match &request {
            Request::Single(cmd) => cmd.query_async(conn).await,
            Request::Atomic(pipe) => pipe.query_async(conn).await,
        };
        result.map_err(|err| {
            tracing::warn!(
                event = SessionEvent::SessionValkeyCommandFailed.as_str(),
                operation,
                error = %err,
                "valkey command failed; dropping connection"
            );
            *slot = None;
            anyhow::Error::new(err).context(format!("valkey {operation} failed"))
        })
    }

    /// RPUSH the encoded items and refresh the list TTL in one MULTI/EXEC.
    pub(crate) async fn append_items(
        &self,
        session_id: &str,
        items: &[SessionItem],
        ttl_secs: u64,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let key = self.items_key(session_id);
        let mut payloads = Vec::with_capacity(items.len());
        for item in items {
            payloads.push(serde_json::to_string(item).context("failed to encode session item")?);
        }

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("RPUSH")
            .arg(&key)
            .arg(&payloads)
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(ttl_secs)
            .ignore();
        self.execute::<()>("append_items", Request::Atomic(pipe))
            .await?;
        tracing::debug!(
            event = SessionEvent::SessionItemsAppended.as_str(),
            session_id,
            appended_items = payloads.len(),
            ttl_secs,
            backend = "valkey",
            "session items appended"
        );
        Ok(())
    }

    pub(crate) async fn get_items(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SessionItem>> {
        // LRANGE with a negative start reads the tail of the list.
        let start = match limit {
            Some(0) => return Ok(Vec::new()),
            Some(limit) => i64::try_from(limit).map_or(0, |limit| -limit),
            None => 0,
        };
        let mut cmd = redis::cmd("LRANGE");
        cmd.arg(self.items_key(session_id)).arg(start).arg(-1);
        let payloads: Vec<String> = self.execute("get_items", Request::Single(cmd)).await?;
        let (items, invalid_payloads) = decode_items(session_id, &payloads);
        tracing::debug!(
            event = SessionEvent::SessionItemsLoaded.as_str(),
            session_id,
            requested_limit = ?limit,
            loaded_items = items.len(),
            invalid_payloads,
            backend = "valkey",
            "session items loaded"
        );
        Ok(items)
    }

    pub(crate) async fn pop_item(&self, session_id: &str) -> Result<Option<SessionItem>> {
        let request = Request::key_command("RPOP", &self.items_key(session_id));
        let popped: Option<String> = self.execute("pop_item", request).await?;
        popped
            .map(|payload| {
                serde_json::from_str::<SessionItem>(&payload)
                    .context("popped session item is not valid json")
            })
            .transpose()
    }

    pub(crate) async fn clear(&self, session_id: &str) -> Result<()> {
        let request = Request::key_command("DEL", &self.items_key(session_id));
        let _: i64 = self.execute("clear_session", request).await?;
        Ok(())
    }

    pub(crate) async fn len(&self, session_id: &str) -> Result<usize> {
        let request = Request::key_command("LLEN", &self.items_key(session_id));
        self.execute("session_len", request).await
    }

    /// Remaining TTL; `None` when no expiry is set (-1) or the key is absent (-2).
    pub(crate) async fn ttl(&self, session_id: &str) -> Result<Option<u64>> {
        let request = Request::key_command("TTL", &self.items_key(session_id));
        let ttl: i64 = self.execute("session_ttl", request).await?;
        Ok(u64::try_from(ttl).ok().filter(|secs| *secs > 0))
    }

    /// `EXPIRE` is a no-op on absent keys; returns whether a TTL was set.
    pub(crate) async fn expire(&self, session_id: &str, ttl_secs: u64) -> Result<bool> {
        let mut cmd = redis::cmd("EXPIRE");
        cmd.arg(self.items_key(session_id)).arg(ttl_secs);
        let updated: i64 = self.execute("extend_ttl", Request::Single(cmd)).await?;
        Ok(updated == 1)
    }

    pub(crate) async fn close(&self) {
        if self.connection.lock().await.take().is_some() {
            tracing::debug!(
                event = SessionEvent::SessionValkeyConnectionClosed.as_str(),
                key_prefix = %self.key_prefix,
                "valkey session backend connection closed"
            );
        }
    }
}

/// Decode list elements, skipping (and counting) ones that are not valid items.
fn decode_items(session_id: &str, payloads: &[String]) -> (Vec<SessionItem>, usize) {
    let mut items = Vec::with_capacity(payloads.len());
    let mut invalid = 0usize;
    for (position, payload) in payloads.iter().enumerate() {
        match serde_json::from_str::<SessionItem>(payload) {
            Ok(item) => items.push(item),
            Err(error) => {
                invalid += 1;
                tracing::warn!(
                    event = SessionEvent::SessionItemsInvalidPayload.as_str(),
                    session_id,
                    position,
                    error = %error,
                    "skipping undecodable session item"
                );
            }
        }
    }
    (items, invalid)
}
