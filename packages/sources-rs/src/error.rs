//! Typed errors for inventory lookups.
//!
//! Uses `thiserror` so callers can match on the failure mode; the server's
//! health endpoint needs to tell "unreachable" apart from "wrong status".

use thiserror::Error;

/// Errors returned by [`SourcesLookup`](crate::SourcesLookup) operations.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Building the shared HTTP client failed.
    #[error("could not build the sources-api HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, timeout).
    #[error("could not reach the sources-api at {path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The inventory answered with a status the operation does not accept.
    #[error("sources-api returned an unexpected status {status} for {path}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        path: String,
    },

    /// The response body did not decode into the expected shape.
    #[error("could not decode the sources-api response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl LookupError {
    /// Whether the inventory was reached but answered with a bad status.
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, LookupError::UnexpectedStatus { .. })
    }
}
