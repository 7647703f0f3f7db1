use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use request_pool::{
    CancellationToken, Handler, QueryConfig, QueryParams, RequestPool, Status, StatusEvent,
    Transport, TransportError, TransportResponse,
};

/// Polls `condition` until it holds, yielding to the dispatched request
/// tasks in between. Requests are fire-and-forget, so tests observe
/// completion the same way real handlers do: through delivered events.
async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition must be reached in time");
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<StatusEvent>>,
}

impl EventLog {
    fn record(&self, event: &StatusEvent) {
        self.events.lock().expect("no poison").push(event.clone());
    }

    fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().expect("no poison").clone()
    }

    fn terminal_events(&self) -> Vec<StatusEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.status != Status::Loading)
            .collect()
    }
}

/// Always asks for the same URL, whatever the query.
struct FixedHandler {
    url: Option<&'static str>,
    log: EventLog,
}

impl FixedHandler {
    fn new(url: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            url,
            log: EventLog::default(),
        })
    }
}

impl Handler for FixedHandler {
    fn assemble_url(&self, _query: &QueryConfig) -> Option<String> {
        self.url.map(str::to_owned)
    }

    fn update_response_status(&self, event: &StatusEvent) {
        self.log.record(event);
    }
}

/// Folds the query string into its URL, like the filterable components do.
struct FilteredHandler {
    base: &'static str,
    log: EventLog,
}

impl FilteredHandler {
    fn new(base: &'static str) -> Arc<Self> {
        Arc::new(Self {
            base,
            log: EventLog::default(),
        })
    }
}

impl Handler for FilteredHandler {
    fn assemble_url(&self, query: &QueryConfig) -> Option<String> {
        match &query.query_string {
            Some(params) if !params.is_empty() => Some(format!("{}?{params}", self.base)),
            _ => Some(self.base.to_owned()),
        }
    }

    fn update_response_status(&self, event: &StatusEvent) {
        self.log.record(event);
    }
}

/// Resolves immediately with the scripted status, recording every URL.
struct RespondingTransport {
    status: u16,
    body: &'static str,
    calls: Mutex<Vec<String>>,
}

impl RespondingTransport {
    fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("no poison").clone()
    }
}

#[async_trait]
impl Transport for RespondingTransport {
    async fn fetch(
        &self,
        url: &str,
        _token: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().expect("no poison").push(url.to_owned());
        Ok(TransportResponse::from_status(self.status, self.body))
    }
}

/// Keeps fetches of one URL in flight until their token is cancelled,
/// then aborts them; every other URL resolves immediately. Mimics a slow
/// request being superseded by a quick one.
struct HangingTransport {
    hanging: &'static str,
    abort_reason: Mutex<Option<String>>,
}

impl HangingTransport {
    fn new(hanging: &'static str) -> Arc<Self> {
        Arc::new(Self {
            hanging,
            abort_reason: Mutex::new(None),
        })
    }

    fn abort_reason(&self) -> Option<String> {
        self.abort_reason.lock().expect("no poison").clone()
    }
}

#[async_trait]
impl Transport for HangingTransport {
    async fn fetch(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        if url == self.hanging {
            token.cancelled().await;

            let reason = token.reason().unwrap_or_default();
            *self.abort_reason.lock().expect("no poison") = Some(reason.clone());

            return Err(TransportError::Cancelled {
                url: url.to_owned(),
                reason,
            });
        }

        Ok(TransportResponse::from_status(200, "second"))
    }
}

/// Fails the connection for one URL and serves every other one.
struct PartiallyBrokenTransport {
    broken: &'static str,
}

#[async_trait]
impl Transport for PartiallyBrokenTransport {
    async fn fetch(
        &self,
        url: &str,
        _token: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        if url == self.broken {
            return Err(TransportError::Connection {
                url: url.to_owned(),
                reason: "connection refused".to_owned(),
            });
        }

        Ok(TransportResponse::from_status(200, "fine"))
    }
}

#[tokio::test]
async fn test_handlers_sharing_a_url_share_one_fetch() {
    let transport = RespondingTransport::new(200, "payload");
    let mut pool = RequestPool::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let first = FixedHandler::new(Some("/a"));
    let second = FixedHandler::new(Some("/b"));
    let third = FixedHandler::new(Some("/a"));
    pool.add_handler(Arc::clone(&first) as Arc<dyn Handler>);
    pool.add_handler(Arc::clone(&second) as Arc<dyn Handler>);
    pool.add_handler(Arc::clone(&third) as Arc<dyn Handler>);

    pool.load_content(&QueryConfig::new())
        .expect("batch must dispatch");
    wait_until(|| {
        [&first, &second, &third]
            .iter()
            .all(|handler| handler.log.terminal_events().len() == 1)
    })
    .await;

    let mut calls = transport.calls();
    calls.sort();
    assert_eq!(calls, vec!["/a".to_owned(), "/b".to_owned()]);

    // Handlers on the same URL see byte-for-byte identical sequences.
    assert_eq!(first.log.events(), third.log.events());
    assert_eq!(first.log.events()[0].status, Status::Loading);
    assert_eq!(first.log.events()[1].status, Status::Loaded);
    assert_eq!(first.log.events()[1].content, Some("payload".to_owned()));
}

#[tokio::test]
async fn test_a_non_2xx_response_is_fanned_out_as_failed() {
    let transport = RespondingTransport::new(503, "overloaded");
    let mut pool = RequestPool::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let first = FixedHandler::new(Some("/a"));
    let second = FixedHandler::new(Some("/a"));
    pool.add_handler(Arc::clone(&first) as Arc<dyn Handler>);
    pool.add_handler(Arc::clone(&second) as Arc<dyn Handler>);

    pool.load_content(&QueryConfig::new())
        .expect("batch must dispatch");
    wait_until(|| {
        !first.log.terminal_events().is_empty() && !second.log.terminal_events().is_empty()
    })
    .await;

    assert_eq!(first.log.events(), second.log.events());

    let terminal = &first.log.terminal_events()[0];
    assert_eq!(terminal.status, Status::Failed);
    assert_eq!(terminal.content, Some("overloaded".to_owned()));
    let response = terminal.response.expect("terminal events carry a response");
    assert!(!response.ok);
    assert_eq!(response.status_code, 503);
}

#[tokio::test]
async fn test_a_newer_batch_supersedes_the_one_in_flight() {
    let transport = HangingTransport::new("/items");
    let mut pool = RequestPool::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let handler = FilteredHandler::new("/items");
    pool.add_handler(Arc::clone(&handler) as Arc<dyn Handler>);

    // The unfiltered batch hangs on the wire; the filtered one resolves.
    pool.load_content(&QueryConfig::new())
        .expect("first batch must dispatch");
    let mut params = QueryParams::new();
    params.append("page", "2");
    pool.load_content(&QueryConfig::with_query_string(params))
        .expect("second batch must dispatch");

    wait_until(|| !handler.log.terminal_events().is_empty()).await;

    // Only the second batch delivers a result; the first one's abort is
    // swallowed after its loading event.
    let terminal = handler.log.terminal_events();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].status, Status::Loaded);
    assert_eq!(terminal[0].url, "/items?page=2");
    assert_eq!(terminal[0].content, Some("second".to_owned()));

    wait_until(|| transport.abort_reason().is_some()).await;
    assert_eq!(
        transport.abort_reason(),
        Some("superseded by newer interaction".to_owned())
    );
    assert!(!pool.is_current_batch_cancelled());
}

#[tokio::test]
async fn test_urls_are_fetched_again_for_every_batch() {
    let transport = RespondingTransport::new(200, "payload");
    let mut pool = RequestPool::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let handler = FixedHandler::new(Some("/a"));
    pool.add_handler(Arc::clone(&handler) as Arc<dyn Handler>);

    pool.load_content(&QueryConfig::new())
        .expect("first batch must dispatch");
    wait_until(|| handler.log.terminal_events().len() == 1).await;

    pool.load_content(&QueryConfig::new())
        .expect("second batch must dispatch");
    wait_until(|| handler.log.terminal_events().len() == 2).await;

    // No caching between batches: the same URL is fetched twice.
    assert_eq!(transport.calls(), vec!["/a".to_owned(), "/a".to_owned()]);
}

#[tokio::test]
async fn test_the_query_string_reaches_the_assembled_url() {
    let transport = RespondingTransport::new(200, "filtered");
    let mut pool = RequestPool::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let handler = FilteredHandler::new("/items");
    pool.add_handler(Arc::clone(&handler) as Arc<dyn Handler>);

    let mut params = QueryParams::new();
    params.append("tag", "rust");
    pool.load_content(&QueryConfig::with_query_string(params))
        .expect("batch must dispatch");

    wait_until(|| !transport.calls().is_empty()).await;

    assert_eq!(transport.calls(), vec!["/items?tag=rust".to_owned()]);
}

#[tokio::test]
async fn test_one_broken_request_does_not_disturb_its_siblings() {
    let transport = Arc::new(PartiallyBrokenTransport { broken: "/bad" });
    let mut pool = RequestPool::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let healthy = FixedHandler::new(Some("/good"));
    let broken = FixedHandler::new(Some("/bad"));
    pool.add_handler(Arc::clone(&healthy) as Arc<dyn Handler>);
    pool.add_handler(Arc::clone(&broken) as Arc<dyn Handler>);

    pool.load_content(&QueryConfig::new())
        .expect("batch must dispatch");
    wait_until(|| healthy.log.terminal_events().len() == 1).await;

    assert_eq!(healthy.log.terminal_events()[0].status, Status::Loaded);

    // The broken sibling got as far as loading; its connection error was
    // swallowed by the pool, not delivered as an event.
    wait_until(|| !broken.log.events().is_empty()).await;
    let events = broken.log.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, Status::Loading);
}

#[tokio::test]
async fn test_handlers_can_sit_a_batch_out() {
    let transport = RespondingTransport::new(200, "payload");
    let mut pool = RequestPool::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let active = FixedHandler::new(Some("/a"));
    let dormant = FixedHandler::new(None);
    pool.add_handler(Arc::clone(&active) as Arc<dyn Handler>);
    pool.add_handler(Arc::clone(&dormant) as Arc<dyn Handler>);

    pool.load_content(&QueryConfig::new())
        .expect("batch must dispatch");
    wait_until(|| active.log.terminal_events().len() == 1).await;

    assert_eq!(transport.calls(), vec!["/a".to_owned()]);
    assert!(dormant.log.events().is_empty());
}
