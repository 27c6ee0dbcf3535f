//! Declarative endpoint descriptions.
//!
//! A `Target` names one logical endpoint call: where it goes, which method it
//! uses, which headers it adds and how its payload is encoded. Callers build
//! one per endpoint shape and pass it to `NetworkService::request`.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::http::HttpMethod;

/// Query parameters keyed by name. A `BTreeMap` keeps the encoded query
/// string stable across builds.
pub type Parameters = BTreeMap<String, Value>;

/// How a target's payload is put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// No query and no body.
    Plain,
    /// Query-encoded onto the URL; no body.
    Parameters(Parameters),
    /// Sent verbatim as the body.
    RawBody(Bytes),
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(Value),
    /// Query-encoded parameters and a verbatim body, independently.
    Composite { parameters: Parameters, body: Bytes },
}

impl Task {
    /// Capture any serializable value as a JSON task.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Task::Json)
    }

    /// Build a `Parameters` task from `(name, value)` pairs.
    pub fn parameters<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Task::Parameters(collect_parameters(pairs))
    }

    /// Build a `Composite` task from `(name, value)` pairs and a body.
    pub fn composite<K, V, I>(pairs: I, body: impl Into<Bytes>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Task::Composite {
            parameters: collect_parameters(pairs),
            body: body.into(),
        }
    }
}

fn collect_parameters<K, V, I>(pairs: I) -> Parameters
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Textual form of a query value: strings as-is, everything else as
/// compact JSON (`42`, `true`, `null`, `[1,2]`).
pub fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One endpoint call.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub path: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub task: Task,
}

impl Target {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: BTreeMap::new(),
            task: Task::Plain,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }
}
