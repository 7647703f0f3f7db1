use async_trait::async_trait;
use thiserror::Error;

use crate::cancellation::CancellationToken;

/// The injectable fetch primitive. The pool never talks to a network
/// itself; embedders supply whatever transport fits their environment and
/// tests supply scripted ones.
///
/// Implementations must honor the token: once cancellation is observed,
/// return [`TransportError::Cancelled`] instead of resolving. A transport
/// that resolves late anyway is tolerated (the request layer re-checks
/// the token before delivering a terminal event) but must never deliver
/// side effects of its own for a cancelled fetch.
///
/// A non-2xx response is a *successful* transport call with
/// [`TransportResponse::ok`] set to `false`, not an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<TransportResponse, TransportError>;
}

/// What came back from one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Whether the status code is in the 2xx range.
    pub ok: bool,
    /// HTTP-style status code.
    pub status: u16,
    /// Textual response body.
    pub body: String,
}

impl TransportResponse {
    /// Build a response from a status code, deriving `ok`.
    #[must_use]
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status,
            body: body.into(),
        }
    }
}

/// Failures below the response level: the fetch never produced a usable
/// response. These propagate out of `Request::dispatch` and are swallowed
/// (logged) by the pool, never delivered to handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The fetch was aborted through its cancellation token.
    #[error("request for {url} was cancelled: {reason}")]
    Cancelled {
        /// URL of the aborted fetch.
        url: String,
        /// Reason recorded by the cancelling side.
        reason: String,
    },

    /// The transport could not complete the exchange at all.
    #[error("connection to {url} failed: {reason}")]
    Connection {
        /// URL of the failed fetch.
        url: String,
        /// Transport-specific failure description.
        reason: String,
    },
}
