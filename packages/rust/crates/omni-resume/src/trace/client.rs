//! HTTP client for the trace API (`/api/public/traces`, `/api/public/observations`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::observability::SessionEvent;

use super::error::{FetchError, RecordError};
use super::record::{Observation, Trace};
use super::sessions::{SessionSummary, summarize_sessions};

pub const DEFAULT_TRACE_HOST: &str = "https://cloud.langfuse.com";
/// API maximum page size.
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_MAX_PAGES: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const RECENT_TRACES_PAGE_SIZE: usize = 20;
const ERROR_BODY_PREVIEW_CHARS: usize = 200;
const TRACES_PATH: [&str; 3] = ["api", "public", "traces"];
const OBSERVATIONS_PATH: [&str; 3] = ["api", "public", "observations"];

/// Injected fetcher configuration (resolved by the bootstrap layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFetcherConfig {
    pub host: String,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub timeout_secs: u64,
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for TraceFetcherConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TRACE_HOST.to_string(),
            public_key: None,
            secret_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Result of one fetch operation: whatever was decoded, plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub records: Vec<T>,
    /// Malformed records dropped at the boundary.
    pub skipped: usize,
    pub error: Option<FetchError>,
}

impl<T> Fetched<T> {
    #[must_use]
    pub fn ok(records: Vec<T>, skipped: usize) -> Self {
        Self {
            records,
            skipped,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: FetchError) -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            error: Some(error),
        }
    }
}

#[derive(Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Deserialize)]
struct PageMeta {
    #[serde(rename = "totalPages")]
    total_pages: Option<u64>,
}

struct Page {
    data: Vec<Value>,
    total_pages: Option<u64>,
}

/// Read-only trace/observation client.
///
/// Missing credentials, or a 401/403 response, disable the client for its lifetime;
/// disabled calls return empty results without touching the network.
pub struct TraceFetcher {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
    page_size: usize,
    max_pages: usize,
    disabled: AtomicBool,
}

impl TraceFetcher {
    #[must_use]
    pub fn new(config: TraceFetcherConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_default();
        let credentials = match (config.public_key, config.secret_key) {
            (Some(public_key), Some(secret_key))
                if !public_key.trim().is_empty() && !secret_key.trim().is_empty() =>
            {
                Some((public_key, secret_key))
            }
            _ => None,
        };
        if credentials.is_none() {
            tracing::info!(
                event = SessionEvent::TraceFetchDisabled.as_str(),
                host = %config.host,
                "trace api credentials not configured; history reconstruction disabled"
            );
        }
        let disabled = AtomicBool::new(credentials.is_none());
        Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
            credentials,
            page_size: config.page_size.max(1),
            max_pages: config.max_pages,
            disabled,
        }
    }

    /// Whether the integration has been disabled (missing or rejected credentials).
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Default page budget for paginated session fetches.
    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Endpoint URL under the host; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let invalid_host = |reason: String| {
            FetchError::Connectivity(format!("invalid trace api host {}: {reason}", self.base_url))
        };
        let mut url = Url::parse(&self.base_url).map_err(|error| invalid_host(error.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid_host("cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(
        &self,
        operation: &'static str,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        if self.is_disabled() {
            return Err(FetchError::Disabled);
        }
        let Some((public_key, secret_key)) = self.credentials.as_ref() else {
            return Err(FetchError::Disabled);
        };
        let started = Instant::now();
        let url = self.endpoint(path)?;
        let resp = match self
            .client
            .get(url.clone())
            .basic_auth(public_key, Some(secret_key))
            .query(query)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(error) => {
                tracing::warn!(
                    event = SessionEvent::TraceFetchFailed.as_str(),
                    operation,
                    url = %url,
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %error,
                    "trace api request failed"
                );
                return Err(FetchError::Connectivity(error.to_string()));
            }
        };
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.disabled.store(true, Ordering::Relaxed);
            tracing::warn!(
                event = SessionEvent::TraceFetchAuthFailed.as_str(),
                operation,
                status = %status,
                "trace api rejected credentials; integration disabled"
            );
            return Err(FetchError::Authentication(status.as_u16()));
        }
        if !status.is_success() {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(ERROR_BODY_PREVIEW_CHARS)
                .collect();
            tracing::warn!(
                event = SessionEvent::TraceFetchFailed.as_str(),
                operation,
                status = %status,
                elapsed_ms = started.elapsed().as_millis(),
                body = %body,
                "trace api returned non-success status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        match resp.json::<Value>().await {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::warn!(
                    event = SessionEvent::TraceFetchFailed.as_str(),
                    operation,
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %error,
                    "trace api response decode failed"
                );
                Err(FetchError::Decode(error.to_string()))
            }
        }
    }

    async fn get_page(
        &self,
        operation: &'static str,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<Page, FetchError> {
        let value = self.get_json(operation, path, query).await?;
        let envelope: ListEnvelope = serde_json::from_value(value).map_err(|error| {
            tracing::warn!(
                event = SessionEvent::TraceFetchFailed.as_str(),
                operation,
                error = %error,
                "trace api list envelope has unexpected shape"
            );
            FetchError::Decode(error.to_string())
        })?;
        Ok(Page {
            data: envelope.data,
            total_pages: envelope.meta.and_then(|meta| meta.total_pages),
        })
    }

    async fn list<T, F>(
        &self,
        operation: &'static str,
        path: &[&str],
        query: &[(&str, String)],
        decode: F,
    ) -> Fetched<T>
    where
        F: Fn(&Value) -> Result<T, RecordError>,
    {
        match self.get_page(operation, path, query).await {
            Ok(page) => {
                let (records, skipped) = decode_records(operation, &page.data, decode);
                tracing::debug!(
                    event = SessionEvent::TraceFetchCompleted.as_str(),
                    operation,
                    records = records.len(),
                    skipped,
                    "trace api fetch completed"
                );
                Fetched::ok(records, skipped)
            }
            Err(error) => Fetched::failed(error),
        }
    }

    /// Traces belonging to one session (single bounded request).
    pub async fn get_session_traces(&self, session_id: &str) -> Fetched<Trace> {
        let query = [
            ("sessionId", session_id.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        self.list(
            "get_session_traces",
            &TRACES_PATH,
            &query,
            Trace::from_value,
        )
        .await
    }

    /// One trace by id; `records` holds at most one entry.
    pub async fn get_trace(&self, trace_id: &str) -> Fetched<Trace> {
        let path = ["api", "public", "traces", trace_id];
        match self.get_json("get_trace", &path, &[]).await {
            Ok(value) => {
                let (records, skipped) =
                    decode_records("get_trace", std::slice::from_ref(&value), Trace::from_value);
                Fetched::ok(records, skipped)
            }
            Err(error) => Fetched::failed(error),
        }
    }

    /// Observations of one trace (single bounded request).
    pub async fn get_observations(&self, trace_id: &str) -> Fetched<Observation> {
        let query = [
            ("traceId", trace_id.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        self.list(
            "get_observations",
            &OBSERVATIONS_PATH,
            &query,
            Observation::from_value,
        )
        .await
    }

    /// Observations filtered by session id (single bounded request).
    ///
    /// The API may not filter precisely on this path; prefer per-trace fetches when
    /// exact scoping matters.
    pub async fn get_session_observations(&self, session_id: &str) -> Fetched<Observation> {
        let query = [
            ("sessionId", session_id.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        self.list(
            "get_session_observations",
            &OBSERVATIONS_PATH,
            &query,
            Observation::from_value,
        )
        .await
    }

    /// Session observations across pages, at most `max_pages` requests.
    ///
    /// Stops on an empty page, on the reported last page, or on the first failed
    /// request (keeping what was already accumulated).
    pub async fn get_session_observations_paginated(
        &self,
        session_id: &str,
        max_pages: usize,
    ) -> Fetched<Observation> {
        let mut records = Vec::new();
        let mut skipped = 0usize;
        let mut error = None;
        let mut pages_requested = 0usize;
        let mut stop_reason = "max_pages";

        for page in 1..=max_pages {
            pages_requested += 1;
            let query = [
                ("sessionId", session_id.to_string()),
                ("limit", self.page_size.to_string()),
                ("page", page.to_string()),
            ];
            let result = self
                .get_page(
                    "get_session_observations_paginated",
                    &OBSERVATIONS_PATH,
                    &query,
                )
                .await;
            let page_data = match result {
                Ok(page_data) => page_data,
                Err(fetch_error) => {
                    error = Some(fetch_error);
                    stop_reason = "request_failed";
                    break;
                }
            };
            if page_data.data.is_empty() {
                stop_reason = "empty_page";
                break;
            }
            let (decoded, page_skipped) = decode_records(
                "get_session_observations_paginated",
                &page_data.data,
                Observation::from_value,
            );
            tracing::debug!(
                event = SessionEvent::TracePageFetched.as_str(),
                session_id,
                page,
                records = decoded.len(),
                skipped = page_skipped,
                total_pages = ?page_data.total_pages,
                "observation page fetched"
            );
            records.extend(decoded);
            skipped += page_skipped;
            let total_pages = page_data.total_pages.unwrap_or(1);
            if u64::try_from(page).unwrap_or(u64::MAX) >= total_pages {
                stop_reason = "last_page";
                break;
            }
        }

        tracing::debug!(
            event = SessionEvent::TracePaginationStopped.as_str(),
            session_id,
            pages_requested,
            max_pages,
            records = records.len(),
            skipped,
            stop_reason,
            "observation pagination finished"
        );
        Fetched {
            records,
            skipped,
            error,
        }
    }

    /// Most recent sessions seen in the latest traces, newest activity first.
    pub async fn list_recent_sessions(&self, limit: usize) -> Fetched<SessionSummary> {
        let query = [("limit", RECENT_TRACES_PAGE_SIZE.to_string())];
        let traces = self
            .list(
                "list_recent_sessions",
                &TRACES_PATH,
                &query,
                Trace::from_value,
            )
            .await;
        Fetched {
            records: summarize_sessions(&traces.records, limit),
            skipped: traces.skipped,
            error: traces.error,
        }
    }
}

fn decode_records<T, F>(operation: &'static str, values: &[Value], decode: F) -> (Vec<T>, usize)
where
    F: Fn(&Value) -> Result<T, RecordError>,
{
    let mut records = Vec::with_capacity(values.len());
    let mut skipped = 0usize;
    for (position, value) in values.iter().enumerate() {
        match decode(value) {
            Ok(record) => records.push(record),
            Err(error) => {
                skipped += 1;
                tracing::warn!(
                    event = SessionEvent::TraceRecordMalformed.as_str(),
                    operation,
                    position,
                    error = %error,
                    "skipping malformed trace record"
                );
            }
        }
    }
    (records, skipped)
}
