//! Error types for trace fetching and record validation.
//!
//! Follows ODF-REP: library modules use `thiserror` for explicit error enums.

use thiserror::Error;

/// Why a fetch returned no (or partial) data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure reaching the trace API.
    #[error("trace api unreachable: {0}")]
    Connectivity(String),

    /// Credentials rejected; the fetcher disables itself afterwards.
    #[error("trace api rejected credentials (status {0})")]
    Authentication(u16),

    /// Any other non-success status.
    #[error("trace api returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Response body is not the expected JSON envelope.
    #[error("trace api response decode failed: {0}")]
    Decode(String),

    /// Integration disabled (missing or rejected credentials).
    #[error("trace integration disabled")]
    Disabled,
}

/// A record from the trace API that does not have the expected shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Record is not a JSON object.
    #[error("record is not a json object")]
    NotAnObject,

    /// A required field is absent, null or empty.
    #[error("record missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong type or format.
    #[error("record field `{0}` has an invalid value")]
    InvalidField(&'static str),
}
