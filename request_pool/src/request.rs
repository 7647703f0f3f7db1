use std::fmt;

use crate::{
    cancellation::CancellationToken,
    errors::PoolError,
    status::StatusEvent,
    transport::{Transport, TransportError},
};

type StatusListener = Box<dyn Fn(&StatusEvent) + Send + Sync>;

/// One fetch of one URL, fanning its lifecycle events out to every
/// registered listener.
///
/// A `Request` lives for a single batch: it moves from loading to exactly
/// one terminal event and is never reused, even when a later batch asks
/// for the same URL again.
pub struct Request {
    url: String,
    token: CancellationToken,
    listeners: Vec<StatusListener>,
}

impl Request {
    /// # Errors
    ///
    /// [`PoolError::EmptyUrl`] when `url` is empty.
    pub fn new(url: impl Into<String>, token: CancellationToken) -> Result<Self, PoolError> {
        let url = url.into();

        if url.is_empty() {
            return Err(PoolError::EmptyUrl);
        }

        Ok(Self {
            url,
            token,
            listeners: Vec::new(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Register a listener for every lifecycle event of this request.
    /// Listeners fire in registration order; registering the same logical
    /// listener twice means it fires twice.
    pub fn add_listener(&mut self, listener: impl Fn(&StatusEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Perform the fetch.
    ///
    /// Every listener first receives a `Loading` event, synchronously,
    /// before the transport is touched. A resolved response is then
    /// delivered as one `Loaded` or `Failed` event, unless the token was
    /// cancelled in the meantime, in which case the stale result is
    /// suppressed and nothing further is delivered.
    ///
    /// # Errors
    ///
    /// Transport-level failures (including cancellation aborts) propagate
    /// to the caller; no terminal event is emitted for them.
    pub async fn dispatch(&self, transport: &dyn Transport) -> Result<(), TransportError> {
        self.emit(&StatusEvent::loading(&self.url));

        let response = transport.fetch(&self.url, &self.token).await?;

        if self.token.is_cancelled() {
            log::debug!("suppressing stale response for {}", self.url);
            return Ok(());
        }

        let event = if response.ok {
            StatusEvent::loaded(&self.url, &response)
        } else {
            StatusEvent::failed(&self.url, &response)
        };
        self.emit(&event);

        Ok(())
    }

    fn emit(&self, event: &StatusEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("listeners", &self.listeners.len())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
