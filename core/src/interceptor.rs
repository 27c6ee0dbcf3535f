//! Ordered request/response interceptors.
//!
//! # Design
//! An interceptor may rewrite a request before it is sent and observe the
//! outcome afterwards; it can never alter a response. `InterceptorChain` is a
//! plain ordered dispatcher over the interceptors it was built with. It holds
//! no locks, so an interceptor that keeps state must synchronize it itself.

use std::error::Error as StdError;
use std::sync::Arc;

use log::{debug, warn};

use crate::http::{WireRequest, WireResponse};

/// A pluggable observer/mutator attached to each call.
pub trait Interceptor: Send + Sync {
    /// Mutate the request in place before it is sent.
    fn intercept_request(&self, _request: &mut WireRequest) {}

    /// Observe a completed exchange. Called with the response and body on
    /// success, and with only `error` set when the body failed to decode.
    fn intercept_response(
        &self,
        _response: Option<&WireResponse>,
        _data: Option<&[u8]>,
        _error: Option<&(dyn StdError + 'static)>,
    ) {
    }
}

/// Interceptors in registration order. Immutable once built.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { interceptors }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run every request hook in order; each one sees the changes made by
    /// the ones before it.
    pub fn intercept_request(&self, request: &mut WireRequest) {
        for interceptor in &self.interceptors {
            interceptor.intercept_request(request);
        }
    }

    /// Run every response hook in order.
    pub fn intercept_response(
        &self,
        response: Option<&WireResponse>,
        data: Option<&[u8]>,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        for interceptor in &self.interceptors {
            interceptor.intercept_response(response, data, error);
        }
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

/// Traces every request and response through the `log` facade.
///
/// Header values are never logged, only their names.
#[derive(Debug, Clone)]
pub struct LoggingInterceptor {
    label: String,
}

impl LoggingInterceptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Interceptor for LoggingInterceptor {
    fn intercept_request(&self, request: &mut WireRequest) {
        let names: Vec<&str> = request.headers.iter().map(|(name, _)| name).collect();
        debug!(
            "[{}] -> {} {} headers={:?} body={}B",
            self.label,
            request.method,
            request.url,
            names,
            request.body.as_ref().map_or(0, |b| b.len())
        );
    }

    fn intercept_response(
        &self,
        response: Option<&WireResponse>,
        data: Option<&[u8]>,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        if let Some(error) = error {
            warn!("[{}] <- error: {}", self.label, error);
            return;
        }
        match response {
            Some(response) => debug!(
                "[{}] <- {} body={}B",
                self.label,
                response.status,
                data.map_or(0, <[u8]>::len)
            ),
            None => debug!("[{}] <- no response", self.label),
        }
    }
}
