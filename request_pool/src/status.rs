#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::transport::TransportResponse;

/// Where a request currently stands, as seen by its handlers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The fetch is about to start; always delivered first.
    Loading,
    /// The fetch completed with a 2xx response.
    Loaded,
    /// The fetch completed with a non-2xx response.
    Failed,
}

/// Response metadata carried by terminal events.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSummary {
    pub ok: bool,
    pub status_code: u16,
}

/// One lifecycle notification delivered to every handler of a request.
///
/// Handlers receive a `Loading` event before the fetch starts, then exactly
/// one terminal `Loaded` or `Failed` event; `response` and `content` are
/// populated on terminal events only.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub status: Status,
    pub url: String,
    pub response: Option<ResponseSummary>,
    pub content: Option<String>,
}

impl StatusEvent {
    #[must_use]
    pub fn loading(url: &str) -> Self {
        Self {
            status: Status::Loading,
            url: url.to_owned(),
            response: None,
            content: None,
        }
    }

    #[must_use]
    pub fn loaded(url: &str, response: &TransportResponse) -> Self {
        Self::terminal(Status::Loaded, url, response)
    }

    #[must_use]
    pub fn failed(url: &str, response: &TransportResponse) -> Self {
        Self::terminal(Status::Failed, url, response)
    }

    fn terminal(status: Status, url: &str, response: &TransportResponse) -> Self {
        Self {
            status,
            url: url.to_owned(),
            response: Some(ResponseSummary {
                ok: response.ok,
                status_code: response.status,
            }),
            content: Some(response.body.clone()),
        }
    }
}
