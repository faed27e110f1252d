//! Request bodies.
//!
//! A body is either a structured value that gets serialized to JSON or one
//! of a closed set of raw payloads that reach the transport unchanged.

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::payload::{Blob, FormData};

/// A streamed request body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send + Sync>>;

/// The body of a request.
pub enum Body {
    /// Structured data, sent as JSON text.
    Json(Value),
    Text(String),
    Bytes(Bytes),
    Blob(Blob),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
    Multipart(FormData),
    Stream(ByteStream),
}

impl Body {
    /// Structured body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, FetchError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(FetchError::encode)
    }

    pub fn form<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send + Sync + 'static,
    {
        Body::Stream(Box::pin(stream))
    }

    /// True when the body is already a transport-ready payload and must be
    /// passed through untouched.
    pub fn is_raw(&self) -> bool {
        !matches!(self, Body::Json(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Body::Json(_) => "json",
            Body::Text(_) => "text",
            Body::Bytes(_) => "bytes",
            Body::Blob(_) => "blob",
            Body::Form(_) => "form",
            Body::Multipart(_) => "multipart",
            Body::Stream(_) => "stream",
        }
    }

    /// Serialize a structured body to JSON text; raw payloads pass through.
    pub(crate) fn into_transport(self) -> Result<Body, serde_json::Error> {
        match self {
            Body::Json(value) => serde_json::to_string(&value).map(Body::Text),
            raw => Ok(raw),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Body::Blob(blob) => f.debug_tuple("Blob").field(blob).finish(),
            Body::Form(pairs) => f.debug_tuple("Form").field(pairs).finish(),
            Body::Multipart(form) => f.debug_tuple("Multipart").field(form).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<Blob> for Body {
    fn from(blob: Blob) -> Self {
        Body::Blob(blob)
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::Multipart(form)
    }
}
