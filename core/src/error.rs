//! Error types for the request dispatcher.
//!
//! # Design
//! Callers see a single shape, `FetchError { status, error }`, whichever
//! stage failed. `kind` records that stage for logging and for callers that
//! want it, but nothing forces a match on it. The lower layers keep their own
//! typed errors (`TransportError`, `DecodeError`) and are flattened into
//! `FetchError` at the dispatcher boundary.
//!
//! A failure that never produced an HTTP response (connection refused,
//! timeout) has `status: None`. `status_code()` maps that to `0` for callers
//! that need an integer.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// The stage at which a call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The request never completed: DNS, connect, invalid URL, redirect refusal.
    Transport,
    /// The call was aborted because its timeout elapsed.
    Timeout,
    /// The server answered outside `200..=299`.
    Http,
    /// The response body did not match its declared content type.
    Decode,
    /// The request body or query could not be serialized.
    Encode,
}

/// The failure shape returned by every dispatcher call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub error: String,
    #[serde(skip_serializing)]
    pub kind: FailureKind,
}

impl FetchError {
    /// Non-2xx response. The message is the status text, never the body.
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            error: status_text.into(),
            kind: FailureKind::Http,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            status: None,
            error: format!("request timed out after {}ms", after.as_millis()),
            kind: FailureKind::Timeout,
        }
    }

    pub fn decode(status: u16, err: DecodeError) -> Self {
        Self {
            status: Some(status),
            error: err.to_string(),
            kind: FailureKind::Decode,
        }
    }

    pub fn encode(err: impl fmt::Display) -> Self {
        Self {
            status: None,
            error: format!("failed to encode request: {err}"),
            kind: FailureKind::Encode,
        }
    }

    /// The HTTP status, or `0` when the failure carried none.
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(0)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.error),
            None => f.write_str(&self.error),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        let kind = match err {
            TransportError::Timeout => FailureKind::Timeout,
            _ => FailureKind::Transport,
        };
        Self {
            status: err.status(),
            error: err.to_string(),
            kind,
        }
    }
}

/// Errors raised by a [`Transport`](crate::Transport) while executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("redirect refused: {0}")]
    Redirect(String),
    #[error("invalid request: {0}")]
    Build(String),
    /// A failure that happened after the status line was received.
    #[error("HTTP error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_redirect() {
            TransportError::Redirect(err.to_string())
        } else if err.is_builder() {
            TransportError::Build(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Errors raised while decoding a response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid UTF-8 body: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] multer::Error),
    #[error("expected {expected} body, got {found}")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
    },
}
