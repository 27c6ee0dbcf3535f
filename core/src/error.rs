//! Error types for the network client.
//!
//! # Design
//! `NetworkError` is the closed taxonomy of protocol-level failures the
//! client itself detects. Failures raised by the transport are not mapped
//! into it; they travel separately as `TransportError` so callers see them
//! exactly as the transport reported them. `Error` is the union returned by
//! `NetworkService::request`.

use bytes::Bytes;
use thiserror::Error;

/// Protocol-level failure of a single call. Terminal for that call.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The connectivity monitor reported no connection; nothing was sent.
    #[error("no network connection")]
    NoConnection,

    /// The request URL could not be formed from the base URL and target.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport finished without producing a structured response.
    #[error("transport returned no HTTP response")]
    InvalidResponse,

    /// The server answered with a status outside `200..=299`.
    #[error("HTTP {status} ({} bytes)", .body.len())]
    Http { status: u16, body: Bytes },

    /// The server answered successfully but the body did not match the
    /// expected shape.
    #[error("failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("unknown network error")]
    Unknown,
}

/// Failure raised while performing the byte-level exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP transport failed: {0}")]
    Ureq(#[from] ureq::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be expressed to the HTTP library, e.g. a header
    /// value containing a newline.
    #[error("request rejected by transport: {0}")]
    InvalidRequest(String),

    /// The blocking exchange was cancelled or panicked before completing.
    #[error("transport task aborted: {0}")]
    Aborted(String),
}

/// Everything `request` can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// The protocol-level error, if this is one.
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self {
            Error::Network(e) => Some(e),
            Error::Transport(_) => None,
        }
    }
}
