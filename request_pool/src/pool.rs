use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::Arc,
};

use crate::{
    cancellation::CancellationSource,
    errors::PoolError,
    handler::Handler,
    query::QueryConfig,
    request::Request,
    transport::Transport,
};

const SUPERSEDED: &str = "superseded by newer interaction";

/// Coalesces the content requests of many handlers into at most one fetch
/// per distinct URL, and supersedes the whole in-flight batch whenever a
/// newer query arrives.
///
/// Handlers register once and stay registered; every
/// [`load_content`](RequestPool::load_content) call asks each of them for
/// a URL and wires them onto the resulting shared requests.
pub struct RequestPool {
    transport: Arc<dyn Transport>,
    handlers: Vec<Arc<dyn Handler>>,
    current: Option<CancellationSource>,
}

impl RequestPool {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            handlers: Vec::new(),
            current: None,
        }
    }

    /// Register a handler for all future batches. Handlers are kept for
    /// the pool's whole lifetime, in registration order; registering the
    /// same handler twice wires it up twice.
    pub fn add_handler(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Load content for a new query state.
    ///
    /// Any batch still in flight from a previous call is cancelled first;
    /// its requests may still resolve on the wire, but their results are
    /// suppressed and never reach the handlers. Handlers returning the
    /// same URL share a single request (and therefore a single fetch),
    /// with events fanned out in registration order.
    ///
    /// The requests are dispatched as detached tasks; completion is
    /// observed only through the handlers' status events. Must be called
    /// within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`PoolError::EmptyUrl`] when a handler assembles an empty URL. The
    /// batch is not dispatched in that case, but the previous batch has
    /// already been cancelled.
    pub fn load_content(&mut self, query: &QueryConfig) -> Result<(), PoolError> {
        if let Some(previous) = self.current.take() {
            previous.cancel(SUPERSEDED);
            log::debug!("cancelled the previous content batch: {SUPERSEDED}");
        }

        let source = CancellationSource::new();
        let token = source.token();
        self.current = Some(source);

        let mut requests: Vec<Request> = Vec::new();
        let mut request_indices: HashMap<String, usize> = HashMap::new();

        for handler in &self.handlers {
            let Some(url) = handler.assemble_url(query) else {
                continue;
            };

            let index = match request_indices.entry(url) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    requests.push(Request::new(entry.key().clone(), token.clone())?);
                    entry.insert(requests.len() - 1);
                    requests.len() - 1
                }
            };

            let handler = Arc::clone(handler);
            requests[index].add_listener(move |event| handler.update_response_status(event));
        }

        log::debug!(
            "dispatching {} request(s) for {} handler(s)",
            requests.len(),
            self.handlers.len()
        );

        for request in requests {
            let transport = Arc::clone(&self.transport);

            tokio::spawn(async move {
                // An aborted or unreachable fetch is routine here; the
                // current batch's results arrive through their own tasks.
                if let Err(error) = request.dispatch(transport.as_ref()).await {
                    log::debug!("request dropped: {error}");
                }
            });
        }

        Ok(())
    }

    /// Whether the most recent batch has been superseded. `false` when no
    /// batch was ever dispatched.
    #[must_use]
    pub fn is_current_batch_cancelled(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(CancellationSource::is_cancelled)
    }
}

impl fmt::Debug for RequestPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPool")
            .field("handlers", &self.handlers.len())
            .field("has_active_batch", &self.current.is_some())
            .finish()
    }
}
