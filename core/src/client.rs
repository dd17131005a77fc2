//! The Agave API client and its request pipeline.
//!
//! # Design
//! `AgaveClient` owns an immutable `ClientConfig` and a `Transport`. Every
//! call goes through the same three steps:
//!
//! 1. `build` produces an `HttpRequest` with the base URL and the client
//!    credential headers already attached.
//! 2. `execute` hands it to the transport for exactly one round-trip.
//! 3. `parse_json` maps non-2xx statuses onto `Error` and decodes the body.
//!
//! Resource clients (`ProjectManagement`, `FileManagement`, `Link`) are cheap
//! borrowing views created per call site; they hold no state of their own
//! beyond per-call options, so a single client can be shared across threads.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::file_management::FileManagement;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::link::Link;
use crate::project_management::ProjectManagement;
use crate::transport::{Transport, UreqTransport};
use crate::types::{ListBody, Page};

pub const HEADER_API_VERSION: &str = "API-Version";
pub const HEADER_CLIENT_ID: &str = "Client-Id";
pub const HEADER_CLIENT_SECRET: &str = "Client-Secret";
pub const HEADER_ACCOUNT_TOKEN: &str = "Account-Token";
pub const HEADER_PROJECT_ID: &str = "Project-Id";
pub const HEADER_INCLUDE_SOURCE_DATA: &str = "Include-Source-Data";

/// Synchronous client for the Agave API.
pub struct AgaveClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl AgaveClient<UreqTransport> {
    /// Create a client for the public Agave endpoint with default settings.
    ///
    /// No request is sent until a resource method is called.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(client_id, client_secret))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self { config, transport }
    }

    pub fn from_env() -> Result<Self> {
        ClientConfig::from_env().map(Self::with_config)
    }
}

impl<T: Transport> AgaveClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn project_management(&self) -> ProjectManagement<'_, T> {
        ProjectManagement::new(self)
    }

    pub fn file_management(&self) -> FileManagement<'_, T> {
        FileManagement::new(self)
    }

    pub fn link(&self) -> Link<'_, T> {
        Link::new(self)
    }

    /// Start a request against `path` (relative to the base URL) carrying the
    /// client credential headers.
    pub fn build(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let url = format!("{}/{}", self.config.base_url, path.trim_start_matches('/'));
        HttpRequest::new(method, url)
            .with_header(HEADER_API_VERSION, self.config.api_version.as_str())
            .with_header(HEADER_CLIENT_ID, self.config.client_id.as_str())
            .with_header(HEADER_CLIENT_SECRET, self.config.client_secret.as_str())
    }

    /// Run `request` through the transport once.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.transport.execute(request) {
            Ok(response) => {
                if response.is_success() {
                    debug!(status = response.status, url = %request.url, "received response");
                } else {
                    warn!(status = response.status, url = %request.url, "request rejected");
                }
                Ok(response)
            }
            Err(err) => {
                warn!(url = %request.url, kind = ?err.kind, "request failed: {}", err.message);
                Err(err.into())
            }
        }
    }

    /// Execute `request` and decode a 2xx JSON body into `R`.
    pub fn send<R: DeserializeOwned>(&self, request: &HttpRequest) -> Result<R> {
        parse_json(&self.execute(request)?)
    }

    /// Generic JSON call: credentials are attached, `query` and `headers` are
    /// appended, and `body` (if any) is sent as JSON.
    pub fn request<R, B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.build(method, path);
        for (key, value) in query {
            request = request.with_query(*key, value);
        }
        for (name, value) in headers {
            request = request.with_header(*name, *value);
        }
        if let Some(body) = body {
            request = request.with_json(body)?;
        }
        self.send(&request)
    }

    /// Build an account-scoped request; validation happens before anything
    /// reaches the transport.
    pub(crate) fn scoped(&self, method: HttpMethod, path: &str, scope: &Scope<'_>) -> Result<HttpRequest> {
        let account_token = require("account token", scope.account_token)?;
        let mut request = self
            .build(method, path)
            .with_header(HEADER_ACCOUNT_TOKEN, account_token);
        if let Some(project_id) = scope.project_id {
            request = request.with_header(HEADER_PROJECT_ID, require("project id", project_id)?);
        }
        if !scope.include_source_fields.is_empty() {
            request = request.with_header(HEADER_INCLUDE_SOURCE_DATA, scope.include_source_fields.join(","));
        }
        Ok(request)
    }

    pub(crate) fn fetch_one<R: DeserializeOwned>(&self, path: &str, scope: &Scope<'_>) -> Result<R> {
        let request = self.scoped(HttpMethod::Get, path, scope)?;
        self.send(&request)
    }

    pub(crate) fn fetch_page<R: DeserializeOwned>(
        &self,
        path: &str,
        scope: &Scope<'_>,
        options: ListOptions,
    ) -> Result<Page<R>> {
        let request = self
            .scoped(HttpMethod::Get, path, scope)?
            .with_query("page", options.page)
            .with_query("per_page", options.per_page);
        let body: ListBody<R> = self.send(&request)?;
        Ok(body.into_page())
    }
}

impl<T> fmt::Debug for AgaveClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgaveClient").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Paging parameters sent with list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
        }
    }
}

/// Account (and optionally project) a request is made on behalf of.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub account_token: &'a str,
    pub project_id: Option<&'a str>,
    pub include_source_fields: &'a [String],
}

/// Reject empty values before a request is built.
pub(crate) fn require<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{what} is required")));
    }
    Ok(trimmed)
}

/// Validate an identifier that will be interpolated into a URL path.
///
/// Only RFC 3986 unreserved characters are accepted, so the id reaches the
/// server exactly as given.
pub(crate) fn path_id<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let id = require(what, value)?;
    if !id.chars().all(is_unreserved) {
        return Err(Error::Validation(format!("{what} contains reserved characters: {id}")));
    }
    Ok(id)
}

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// Map non-success status codes to `Error`, otherwise decode the body.
pub fn parse_json<R: DeserializeOwned>(response: &HttpResponse) -> Result<R> {
    if !response.is_success() {
        return Err(Error::from_response(response));
    }
    serde_json::from_str(&response.body).map_err(|e| Error::Deserialization(e.to_string()))
}
