//! Per-call request options.

use std::time::Duration;

use serde::Serialize;

use crate::body::Body;
use crate::error::FetchError;

/// How the transport treats redirect responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RedirectMode {
    #[default]
    Follow,
    /// Fail the call when the server answers with a redirect.
    Error,
    /// Return the redirect response itself.
    Manual,
}

/// Transport settings the dispatcher forwards without inspecting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeOptions {
    pub redirect: Option<RedirectMode>,
}

/// Options accepted by every verb.
///
/// All fields are optional; `RequestOptions::default()` sends a bare request
/// with only the default `Content-Type: application/json` header.
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// Query parameters, appended in order. Repeated keys are kept.
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub body: Option<Body>,
    /// Merged over the default headers; a caller header wins on a
    /// case-insensitive name collision.
    pub headers: Vec<(String, String)>,
    pub native: NativeOptions,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn params<K, V, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.params.extend(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.to_string())),
        );
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Structured body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.body = Some(Body::json(value)?);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn redirect(mut self, mode: RedirectMode) -> Self {
        self.native.redirect = Some(mode);
        self
    }
}
