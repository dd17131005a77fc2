//! Error types for the Agave API client.
//!
//! # Design
//! 404 and 401/403 get dedicated variants because callers routinely branch on
//! "does not exist" and "credentials rejected". Every other non-2xx response
//! lands in `Api` with the status, a best-effort message and the raw body.
//! Network failures never carry a status and stay in `Transport`.

use thiserror::Error;

use crate::http::HttpResponse;

/// Errors returned by `AgaveClient` and its resource clients.
#[derive(Debug, Error)]
pub enum Error {
    /// Client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A call was rejected locally before any request was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned 401 or 403.
    #[error("authentication failed (HTTP {status}): {message}")]
    Auth {
        status: u16,
        message: String,
        body: String,
    },

    /// The server returned 404.
    #[error("resource not found: {message}")]
    NotFound { message: String, body: String },

    /// The server returned any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Classify a non-2xx response.
    pub(crate) fn from_response(response: &HttpResponse) -> Self {
        let message = error_message(response);
        let body = response.body.clone();
        match response.status {
            401 | 403 => Error::Auth {
                status: response.status,
                message,
                body,
            },
            404 => Error::NotFound { message, body },
            status => Error::Api {
                status,
                message,
                body,
            },
        }
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&response.body) {
        for key in ["error", "message", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = response.body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    reason_phrase(response.status).to_string()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        409 => "conflict",
        422 => "unprocessable entity",
        429 => "too many requests",
        500 => "internal server error",
        502 => "bad gateway",
        503 => "service unavailable",
        504 => "gateway timeout",
        _ => "unexpected status",
    }
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The configured timeout elapsed.
    Timeout,
    /// Connection refused, reset, or another socket-level failure.
    Io,
    Other,
}

/// A request that failed before an HTTP response was received.
#[derive(Debug, Clone, Error)]
#[error("transport failure ({kind:?}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}
