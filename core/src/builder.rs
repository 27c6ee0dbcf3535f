//! Pure translation of a `Target` into a `WireRequest`.
//!
//! # Design
//! `build_request` takes everything it needs by reference and returns a fresh
//! request, so a single `Configuration` can serve any number of concurrent
//! builds. Header precedence is: configuration defaults first, target headers
//! second, and the JSON content type last for `Task::Json`.

use bytes::Bytes;
use url::Url;

use crate::config::Configuration;
use crate::error::NetworkError;
use crate::http::{Headers, WireRequest};
use crate::target::{query_value, Parameters, Target, Task};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Build the wire request for `target` against `config`.
pub fn build_request(target: &Target, config: &Configuration) -> Result<WireRequest, NetworkError> {
    let mut url = resolve_url(&config.base_url, &target.path)?;

    let mut headers = Headers::new();
    for (name, value) in &config.default_headers {
        headers.set(name.as_str(), value.as_str());
    }
    for (name, value) in &target.headers {
        headers.set(name.as_str(), value.as_str());
    }

    let body = match &target.task {
        Task::Plain => None,
        Task::Parameters(parameters) => {
            append_query(&mut url, parameters);
            None
        }
        Task::RawBody(bytes) => Some(bytes.clone()),
        Task::Json(value) => {
            // Serializing a `Value` only fails for non-string map keys, which
            // a `Value` cannot hold.
            let encoded = serde_json::to_vec(value).map_err(|_| NetworkError::Unknown)?;
            headers.set(CONTENT_TYPE, APPLICATION_JSON);
            Some(Bytes::from(encoded))
        }
        Task::Composite { parameters, body } => {
            append_query(&mut url, parameters);
            Some(body.clone())
        }
    };

    Ok(WireRequest {
        method: target.method,
        url,
        headers,
        body,
        timeout: config.timeout,
    })
}

/// Append the `/`-separated segments of `path` to `base` as path components.
///
/// Empty segments are skipped, so `"users"`, `"/users"` and `"users/"` all
/// resolve to the same URL.
pub fn resolve_url(base: &Url, path: &str) -> Result<Url, NetworkError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| NetworkError::InvalidUrl(format!("{base} cannot be a base URL")))?;
        segments.pop_if_empty();
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}

fn append_query(url: &mut Url, parameters: &Parameters) {
    if parameters.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (name, value) in parameters {
        pairs.append_pair(name, &query_value(value));
    }
}
