//! Typed request execution.
//!
//! # Design
//! `NetworkClient` runs one call as a fail-fast pipeline: connectivity gate,
//! request build, request interception, transport, status check, response
//! interception, decode. Configuration, interceptors, transport and monitor
//! are shared behind `Arc`s and never written after construction, so one
//! client can serve any number of concurrent calls.
//!
//! Out-of-range statuses fail before any response hook runs. A body that
//! fails to decode triggers a second, error-only response observation.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::builder::build_request;
use crate::config::Configuration;
use crate::error::{Error, NetworkError};
use crate::interceptor::InterceptorChain;
use crate::monitor::{ConnectivityMonitor, NetworkMonitor};
use crate::target::Target;
use crate::transport::{Transport, UreqTransport};

/// Executes targets and decodes their JSON responses.
#[async_trait]
pub trait NetworkService: Send + Sync {
    async fn request<T>(&self, target: &Target) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static;
}

#[derive(Clone)]
pub struct NetworkClient {
    configuration: Arc<Configuration>,
    transport: Arc<dyn Transport>,
    interceptors: Arc<InterceptorChain>,
    monitor: Arc<dyn ConnectivityMonitor>,
}

impl NetworkClient {
    pub fn new(
        configuration: Configuration,
        transport: Arc<dyn Transport>,
        interceptors: InterceptorChain,
        monitor: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            configuration: Arc::new(configuration),
            transport,
            interceptors: Arc::new(interceptors),
            monitor,
        }
    }

    /// A client backed by `UreqTransport` with the given interceptors and an
    /// always-connected `NetworkMonitor`.
    pub fn with_ureq(configuration: Configuration, interceptors: InterceptorChain) -> Self {
        Self::new(
            configuration,
            Arc::new(UreqTransport::new()),
            interceptors,
            Arc::new(NetworkMonitor::new()),
        )
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    pub fn monitor(&self) -> &Arc<dyn ConnectivityMonitor> {
        &self.monitor
    }
}

#[async_trait]
impl NetworkService for NetworkClient {
    async fn request<T>(&self, target: &Target) -> Result<T, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        if !self.monitor.is_connected() {
            warn!("{} {} rejected: offline", target.method, target.path);
            return Err(NetworkError::NoConnection.into());
        }

        let mut request = build_request(target, &self.configuration)?;
        self.interceptors.intercept_request(&mut request);
        debug!("sending {} {}", request.method, request.url);

        let response = self
            .transport
            .send(request)
            .await?
            .ok_or(NetworkError::InvalidResponse)?;

        if !response.is_success() {
            warn!("{} {} failed with HTTP {}", target.method, target.path, response.status);
            return Err(NetworkError::Http {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        self.interceptors
            .intercept_response(Some(&response), Some(&response.body[..]), None);

        serde_json::from_slice(&response.body).map_err(|e| {
            warn!("{} {} returned an undecodable body: {e}", target.method, target.path);
            self.interceptors.intercept_response(None, None, Some(&e));
            NetworkError::Decoding(e).into()
        })
    }
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("configuration", &self.configuration)
            .field("interceptors", &self.interceptors)
            .field("connected", &self.monitor.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, WireRequest, WireResponse};
    use crate::interceptor::Interceptor;
    use crate::target::Task;
    use serde::{Deserialize, Serialize};
    use std::error::Error as StdError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestResponse {
        id: i64,
        name: String,
    }

    enum Reply {
        Status(u16, &'static str),
        Nothing,
        Broken,
    }

    /// Transport double that records every request it is given.
    struct StubTransport {
        reply: Reply,
        sent: Mutex<Vec<WireRequest>>,
    }

    impl StubTransport {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn last(&self) -> WireRequest {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: WireRequest) -> Result<Option<WireResponse>, TransportError> {
            self.sent.lock().unwrap().push(request);
            match self.reply {
                Reply::Status(status, body) => Ok(Some(WireResponse::new(status, body))),
                Reply::Nothing => Ok(None),
                Reply::Broken => Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "reset",
                ))),
            }
        }
    }

    struct StubMonitor(AtomicBool);

    impl ConnectivityMonitor for StubMonitor {
        fn is_connected(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Request,
        Response { status: Option<u16>, data: Option<Vec<u8>>, error: bool },
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Event>>,
        requests: AtomicUsize,
    }

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Interceptor for Recorder {
        fn intercept_request(&self, request: &mut WireRequest) {
            self.requests.fetch_add(1, Ordering::SeqCst);
            request.headers.set("Authorization", "Bearer token");
            self.events.lock().unwrap().push(Event::Request);
        }

        fn intercept_response(
            &self,
            response: Option<&WireResponse>,
            data: Option<&[u8]>,
            error: Option<&(dyn StdError + 'static)>,
        ) {
            self.events.lock().unwrap().push(Event::Response {
                status: response.map(|r| r.status),
                data: data.map(<[u8]>::to_vec),
                error: error.is_some(),
            });
        }
    }

    struct Harness {
        client: NetworkClient,
        transport: Arc<StubTransport>,
        recorder: Arc<Recorder>,
        monitor: Arc<StubMonitor>,
    }

    fn harness(reply: Reply) -> Harness {
        let config = Configuration::parse("https://api.example.com")
            .unwrap()
            .with_default_header("Content-Type", "application/json");
        let transport = StubTransport::new(reply);
        let recorder = Arc::new(Recorder::default());
        let monitor = Arc::new(StubMonitor(AtomicBool::new(true)));
        let recorder_dyn: Arc<dyn Interceptor> = recorder.clone();
        let client = NetworkClient::new(
            config,
            transport.clone(),
            InterceptorChain::new(vec![recorder_dyn]),
            monitor.clone(),
        );
        Harness {
            client,
            transport,
            recorder,
            monitor,
        }
    }

    const OK_BODY: &str = r#"{"id":1,"name":"Test"}"#;

    #[tokio::test]
    async fn no_connection_fails_before_any_work() {
        let h = harness(Reply::Status(200, OK_BODY));
        h.monitor.0.store(false, Ordering::SeqCst);

        let err = h.client.request::<TestResponse>(&Target::get("test")).await.unwrap_err();

        assert!(matches!(err, Error::Network(NetworkError::NoConnection)));
        assert_eq!(h.transport.calls(), 0);
        assert_eq!(h.recorder.requests.load(Ordering::SeqCst), 0);
        assert!(h.recorder.events().is_empty());
    }

    #[tokio::test]
    async fn success_decodes_and_observes_once() {
        let h = harness(Reply::Status(200, OK_BODY));

        let result: TestResponse = h.client.request(&Target::get("test")).await.unwrap();

        assert_eq!(result, TestResponse { id: 1, name: "Test".to_string() });
        assert_eq!(
            h.recorder.events(),
            vec![
                Event::Request,
                Event::Response {
                    status: Some(200),
                    data: Some(OK_BODY.as_bytes().to_vec()),
                    error: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn sends_the_built_and_intercepted_request() {
        let h = harness(Reply::Status(200, OK_BODY));
        let target = Target::new(HttpMethod::Post, "test")
            .with_header("Custom", "Header")
            .with_task(Task::parameters([("key", "value")]));

        let _: TestResponse = h.client.request(&target).await.unwrap();

        let sent = h.transport.last();
        assert_eq!(sent.url.as_str(), "https://api.example.com/test?key=value");
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.headers.get("Custom"), Some("Header"));
        assert_eq!(sent.headers.get("Content-Type"), Some("application/json"));
        assert_eq!(sent.headers.get("Authorization"), Some("Bearer token"));
    }

    #[tokio::test]
    async fn http_error_skips_response_hooks() {
        let h = harness(Reply::Status(404, "not here"));

        let err = h.client.request::<TestResponse>(&Target::get("missing")).await.unwrap_err();

        match err {
            Error::Network(NetworkError::Http { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(&body[..], b"not here");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
        assert_eq!(h.recorder.events(), vec![Event::Request]);
    }

    #[tokio::test]
    async fn server_error_is_an_http_error() {
        let h = harness(Reply::Status(500, ""));
        let err = h.client.request::<TestResponse>(&Target::get("x")).await.unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::Http { status: 500, .. })));
    }

    #[tokio::test]
    async fn decode_failure_observes_error_only() {
        let h = harness(Reply::Status(200, "invalid"));

        let err = h.client.request::<TestResponse>(&Target::get("x")).await.unwrap_err();

        assert!(matches!(err, Error::Network(NetworkError::Decoding(_))));
        assert_eq!(
            h.recorder.events(),
            vec![
                Event::Request,
                Event::Response {
                    status: Some(200),
                    data: Some(b"invalid".to_vec()),
                    error: false,
                },
                Event::Response { status: None, data: None, error: true },
            ]
        );
    }

    #[tokio::test]
    async fn missing_response_is_invalid_response() {
        let h = harness(Reply::Nothing);
        let err = h.client.request::<TestResponse>(&Target::get("x")).await.unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::InvalidResponse)));
        assert_eq!(h.recorder.events(), vec![Event::Request]);
    }

    #[tokio::test]
    async fn transport_failure_propagates_unchanged() {
        let h = harness(Reply::Broken);
        let err = h.client.request::<TestResponse>(&Target::get("x")).await.unwrap_err();
        match err {
            Error::Transport(TransportError::Io(io)) => {
                assert_eq!(io.kind(), std::io::ErrorKind::ConnectionReset)
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_base_url_fails_before_interception() {
        let transport = StubTransport::new(Reply::Status(200, OK_BODY));
        let recorder = Arc::new(Recorder::default());
        let recorder_dyn: Arc<dyn Interceptor> = recorder.clone();
        let client = NetworkClient::new(
            Configuration::parse("data:text/plain,hello").unwrap(),
            transport.clone(),
            InterceptorChain::new(vec![recorder_dyn]),
            Arc::new(NetworkMonitor::new()),
        );

        let err = client.request::<TestResponse>(&Target::get("x")).await.unwrap_err();

        assert!(matches!(err, Error::Network(NetworkError::InvalidUrl(_))));
        assert_eq!(transport.calls(), 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_client() {
        let h = harness(Reply::Status(200, OK_BODY));
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let client = h.client.clone();
                tokio::spawn(async move {
                    client
                        .request::<TestResponse>(&Target::get(format!("items/{i}")))
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().id, 1);
        }
        assert_eq!(h.transport.calls(), 16);
        assert_eq!(h.recorder.requests.load(Ordering::SeqCst), 16);
    }
}
