//! The request dispatcher.
//!
//! # Design
//! `FetchIo` holds nothing but its transport and keeps no state between
//! calls, so one instance can serve any number of concurrent calls. Each
//! call runs the same three steps: [`build_request`] turns the options into
//! plain data, the transport performs the round-trip under the optional
//! timeout, and [`parse_response`] normalizes the outcome. Building and
//! parsing never touch the network; a host with its own HTTP stack can call
//! them directly and skip `FetchIo` altogether.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "reqwest")]
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::http::HttpMethod;
use crate::options::RequestOptions;
use crate::payload::FromPayload;
use crate::request::build_request;
use crate::response::{parse_response, ResponseMessage};
use crate::transport::Transport;
#[cfg(feature = "reqwest")]
use crate::transport::ReqwestTransport;

/// Verb-based HTTP helper over a [`Transport`].
#[derive(Clone)]
pub struct FetchIo {
    transport: Arc<dyn Transport>,
}

impl FetchIo {
    /// Dispatcher over a default [`ReqwestTransport`].
    #[cfg(feature = "reqwest")]
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Issue one request and normalize its outcome.
    ///
    /// When `options.timeout` is set the transport call, including the body
    /// download, is aborted once it elapses and the call fails with
    /// [`FailureKind::Timeout`](crate::FailureKind::Timeout). Nothing is
    /// retried.
    pub async fn request<T: FromPayload>(
        &self,
        method: HttpMethod,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        let request = build_request(method, url, options.unwrap_or_default())?;
        debug!(
            %method,
            url = %request.url,
            body = ?request.body.as_ref().map(|b| b.kind()),
            "dispatching request"
        );

        let timeout = request.timeout;
        let exchange = self.transport.execute(request);
        let outcome = match timeout {
            Some(limit) => match tokio::time::timeout(limit, exchange).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(%method, url, ?limit, "request timed out");
                    return Err(FetchError::timeout(limit));
                }
            },
            None => exchange.await,
        };
        let response = outcome.map_err(|err| {
            warn!(%method, url, error = %err, "transport failed");
            FetchError::from(err)
        })?;

        let result = parse_response(response).await;
        match &result {
            Ok(message) => debug!(%method, url, status = message.status, "request succeeded"),
            Err(err) => debug!(%method, url, status = ?err.status, error = %err.error, "request failed"),
        }
        result
    }

    pub async fn get<T: FromPayload>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        self.request(HttpMethod::Get, url, options).await
    }

    pub async fn post<T: FromPayload>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        self.request(HttpMethod::Post, url, options).await
    }

    pub async fn put<T: FromPayload>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        self.request(HttpMethod::Put, url, options).await
    }

    pub async fn patch<T: FromPayload>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        self.request(HttpMethod::Patch, url, options).await
    }

    pub async fn delete<T: FromPayload>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        self.request(HttpMethod::Delete, url, options).await
    }

    pub async fn head<T: FromPayload>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        self.request(HttpMethod::Head, url, options).await
    }

    pub async fn options<T: FromPayload>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseMessage<T>, FetchError> {
        self.request(HttpMethod::Options, url, options).await
    }
}

#[cfg(feature = "reqwest")]
impl Default for FetchIo {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FetchIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchIo").finish_non_exhaustive()
    }
}

#[cfg(feature = "reqwest")]
static SHARED: Lazy<FetchIo> = Lazy::new(FetchIo::new);

/// The process-wide dispatcher over the default transport.
#[cfg(feature = "reqwest")]
pub fn fetch_io() -> &'static FetchIo {
    &SHARED
}
