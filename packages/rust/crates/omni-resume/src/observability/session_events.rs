/// Stable event ids attached to `tracing` records as the `event` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    SessionBackendEnabled,
    SessionValkeyConnected,
    SessionValkeyCommandFailed,
    SessionValkeyConnectionClosed,
    SessionItemsAppended,
    SessionItemsLoaded,
    SessionItemsInvalidPayload,
    SessionItemPopped,
    SessionItemsCleared,
    SessionTtlExtended,
    SessionTtlExtendSkipped,
    SessionInfoLoaded,
    SessionPrepared,
    SessionRebuildRestored,
    SessionRebuildNoHistory,
    TraceFetchCompleted,
    TraceFetchFailed,
    TraceFetchAuthFailed,
    TraceFetchDisabled,
    TraceRecordMalformed,
    TracePageFetched,
    TracePaginationStopped,
    HistoryExtractionSelected,
    HistoryDedupApplied,
    HistoryHandoffSkipped,
    HistoryReconstructionCompleted,
}

impl SessionEvent {
    pub const ALL: [Self; 26] = [
        Self::SessionBackendEnabled,
        Self::SessionValkeyConnected,
        Self::SessionValkeyCommandFailed,
        Self::SessionValkeyConnectionClosed,
        Self::SessionItemsAppended,
        Self::SessionItemsLoaded,
        Self::SessionItemsInvalidPayload,
        Self::SessionItemPopped,
        Self::SessionItemsCleared,
        Self::SessionTtlExtended,
        Self::SessionTtlExtendSkipped,
        Self::SessionInfoLoaded,
        Self::SessionPrepared,
        Self::SessionRebuildRestored,
        Self::SessionRebuildNoHistory,
        Self::TraceFetchCompleted,
        Self::TraceFetchFailed,
        Self::TraceFetchAuthFailed,
        Self::TraceFetchDisabled,
        Self::TraceRecordMalformed,
        Self::TracePageFetched,
        Self::TracePaginationStopped,
        Self::HistoryExtractionSelected,
        Self::HistoryDedupApplied,
        Self::HistoryHandoffSkipped,
        Self::HistoryReconstructionCompleted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionBackendEnabled => "session.backend.enabled",
            Self::SessionValkeyConnected => "session.valkey.connected",
            Self::SessionValkeyCommandFailed => "session.valkey.command_failed",
            Self::SessionValkeyConnectionClosed => "session.valkey.connection_closed",
            Self::SessionItemsAppended => "session.items.appended",
            Self::SessionItemsLoaded => "session.items.loaded",
            Self::SessionItemsInvalidPayload => "session.items.invalid_payload",
            Self::SessionItemPopped => "session.items.popped",
            Self::SessionItemsCleared => "session.items.cleared",
            Self::SessionTtlExtended => "session.ttl.extended",
            Self::SessionTtlExtendSkipped => "session.ttl.extend_skipped",
            Self::SessionInfoLoaded => "session.info.loaded",
            Self::SessionPrepared => "session.prepared",
            Self::SessionRebuildRestored => "session.rebuild.restored",
            Self::SessionRebuildNoHistory => "session.rebuild.no_history",
            Self::TraceFetchCompleted => "trace.fetch.completed",
            Self::TraceFetchFailed => "trace.fetch.failed",
            Self::TraceFetchAuthFailed => "trace.fetch.auth_failed",
            Self::TraceFetchDisabled => "trace.fetch.disabled",
            Self::TraceRecordMalformed => "trace.record.malformed",
            Self::TracePageFetched => "trace.page.fetched",
            Self::TracePaginationStopped => "trace.pagination.stopped",
            Self::HistoryExtractionSelected => "history.extraction.selected",
            Self::HistoryDedupApplied => "history.dedup.applied",
            Self::HistoryHandoffSkipped => "history.handoff.skipped",
            Self::HistoryReconstructionCompleted => "history.reconstruction.completed",
        }
    }
}
