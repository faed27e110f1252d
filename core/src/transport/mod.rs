//! The seam between the dispatcher and the network.
//!
//! A `Transport` executes one plain-data [`HttpRequest`] and buffers the
//! whole response. It does not interpret status codes: a `404` is a
//! successful round-trip at this layer.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes requests built by the dispatcher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "reqwest")]
pub mod reqwest;

#[cfg(feature = "reqwest")]
pub use self::reqwest::ReqwestTransport;
