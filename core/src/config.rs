//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.agaveapi.com";
pub const DEFAULT_API_VERSION: &str = "2021-11-21";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and connection settings for an `AgaveClient`.
///
/// Built once and then owned by the client, which never mutates it.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read configuration from the environment.
    ///
    /// `AGAVE_CLIENT_ID` and `AGAVE_CLIENT_SECRET` are required.
    /// `AGAVE_BASE_URL`, `AGAVE_API_VERSION` and `AGAVE_TIMEOUT_SECS` override
    /// the defaults when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(required("AGAVE_CLIENT_ID")?, required("AGAVE_CLIENT_SECRET")?);
        if let Some(url) = lookup("AGAVE_BASE_URL") {
            let url = url.trim();
            let host = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"))
                .map(|rest| rest.trim_end_matches('/'));
            if host.map_or(true, str::is_empty) {
                return Err(Error::Config(format!(
                    "AGAVE_BASE_URL must be an http:// or https:// URL: {url:?}"
                )));
            }
            config = config.with_base_url(url);
        }
        if let Some(version) = lookup("AGAVE_API_VERSION") {
            let version = version.trim();
            if version.is_empty() {
                return Err(Error::Config("AGAVE_API_VERSION is empty".to_string()));
            }
            config = config.with_api_version(version);
        }
        if let Some(secs) = lookup("AGAVE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("AGAVE_TIMEOUT_SECS is not a number: {secs}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}
