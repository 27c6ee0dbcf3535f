//! Client-wide configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use crate::error::NetworkError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every request a client sends. Read-only once the
/// client is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub base_url: Url,
    pub timeout: Duration,
    pub default_headers: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            default_headers: BTreeMap::new(),
        }
    }

    /// Parse `base_url` and build a configuration with default settings.
    pub fn parse(base_url: &str) -> Result<Self, NetworkError> {
        let url = Url::parse(base_url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self::new(url))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}
