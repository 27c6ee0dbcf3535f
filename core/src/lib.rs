//! Declarative HTTP client core.
//!
//! # Overview
//! Callers describe endpoints as `Target` values; `NetworkClient` turns each
//! one into a `WireRequest`, runs it through an ordered `InterceptorChain`,
//! sends it over a pluggable `Transport` and decodes the JSON response into
//! the caller's type.
//!
//! # Design
//! - Request building (`builder`) is a pure function of target and
//!   configuration; only the transport performs I/O.
//! - A `ConnectivityMonitor` gates every call before anything is built.
//! - Protocol failures (`NetworkError`) and transport failures
//!   (`TransportError`) stay distinct in the returned `Error`.
//! - `users` shows a typed repository layered on `NetworkService`.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod monitor;
pub mod target;
pub mod transport;
pub mod users;

pub use builder::build_request;
pub use client::{NetworkClient, NetworkService};
pub use config::Configuration;
pub use error::{Error, NetworkError, TransportError};
pub use http::{Headers, HttpMethod, WireRequest, WireResponse};
pub use interceptor::{Interceptor, InterceptorChain, LoggingInterceptor};
pub use monitor::{ConnectionType, ConnectivityMonitor, NetworkMonitor};
pub use target::{Target, Task};
pub use transport::{Transport, UreqTransport};
pub use users::{User, UserDetail, UserRepository, UsersTarget};
