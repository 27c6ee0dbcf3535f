//! The byte-level exchange behind the client.
//!
//! # Design
//! `Transport` is the only seam where I/O happens. The client never looks at
//! transport failures, it hands them to the caller untouched. `UreqTransport`
//! is the production implementation; tests substitute their own.

use async_trait::async_trait;
use bytes::Bytes;
use log::trace;
use ureq::http::{self, Method};

use crate::error::TransportError;
use crate::http::{Headers, HttpMethod, WireRequest, WireResponse};

/// Performs one request/response exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`. `Ok(None)` means the exchange completed without a
    /// structured HTTP response.
    async fn send(&self, request: WireRequest) -> Result<Option<WireResponse>, TransportError>;
}

/// Blocking `ureq` agent run on Tokio's blocking pool.
///
/// One agent is shared by every call so its connection pool keeps idle
/// connections alive between requests. Status codes are returned as data,
/// never as errors, so that status interpretation stays with the client.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: WireRequest) -> Result<Option<WireResponse>, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| TransportError::Aborted(e.to_string()))?
            .map(Some)
    }
}

fn execute(agent: &ureq::Agent, request: WireRequest) -> Result<WireResponse, TransportError> {
    trace!("ureq {} {}", request.method, request.url);
    let timeout = Some(request.timeout);
    let mut builder = http::Request::builder()
        .method(method(request.method))
        .uri(request.url.as_str());
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    let invalid = |e: http::Error| TransportError::InvalidRequest(e.to_string());
    // A unit body tells ureq there is no body at all, which GET and HEAD require.
    let mut response = match request.body {
        Some(body) => {
            let outgoing = builder.body(body.to_vec()).map_err(invalid)?;
            agent.run(agent.configure_request(outgoing).timeout_global(timeout).build())?
        }
        None => {
            let outgoing = builder.body(()).map_err(invalid)?;
            agent.run(agent.configure_request(outgoing).timeout_global(timeout).build())?
        }
    };

    let status = response.status().as_u16();
    let headers: Headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response.body_mut().read_to_vec()?;

    Ok(WireResponse {
        status,
        headers,
        body: Bytes::from(body),
    })
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}
