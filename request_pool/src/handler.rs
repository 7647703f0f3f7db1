use crate::{query::QueryConfig, status::StatusEvent};

/// A participant in content loading: it can name the URL it wants for a
/// given query state, and it consumes the lifecycle events of the fetch
/// that answers it.
///
/// Handlers asking for the same URL within one batch share a single fetch
/// and receive identical event sequences.
pub trait Handler: Send + Sync {
    /// The URL this handler wants for `query`, or `None` to sit the batch
    /// out entirely (no request, no events).
    fn assemble_url(&self, query: &QueryConfig) -> Option<String>;

    /// Called for every lifecycle event of the fetch this handler joined.
    fn update_response_status(&self, event: &StatusEvent);
}
