//! Error types for the ingestion pipeline and the record-store client.

use thiserror::Error;

/// Errors from the record-store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("record store returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Errors surfaced by the ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Event time is not an epoch-millisecond value
    #[error("invalid timestamp {0:?}: expected epoch milliseconds")]
    InvalidTimestamp(String),

    /// An embedded JSON field could not be parsed
    #[error("malformed {field} payload: {source}")]
    MalformedPayload {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A store call failed; propagated without retry
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}
