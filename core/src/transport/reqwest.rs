//! `reqwest`-backed transport.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tracing::debug;

use super::Transport;
use crate::body::Body;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::RedirectMode;
use crate::payload::{FormData, FormValue};

/// Transport over a shared `reqwest::Client`.
///
/// Redirects are followed by the wrapped client. Requests asking for
/// [`RedirectMode::Error`] or [`RedirectMode::Manual`] go through a second,
/// non-following client built on first use.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    no_redirect: OnceCell<reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a caller-configured client. Its settings apply to
    /// [`RedirectMode::Follow`] requests only.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            no_redirect: OnceCell::new(),
        }
    }

    fn client_for(&self, mode: RedirectMode) -> Result<&reqwest::Client, TransportError> {
        match mode {
            RedirectMode::Follow => Ok(&self.inner),
            RedirectMode::Error | RedirectMode::Manual => Ok(self.no_redirect.get_or_try_init(|| {
                reqwest::Client::builder()
                    .redirect(reqwest::redirect::Policy::none())
                    .build()
            })?),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            native,
            ..
        } = request;
        let redirect = native.redirect.unwrap_or_default();
        let is_multipart = matches!(body, Some(Body::Multipart(_)));

        let mut builder = self.client_for(redirect)?.request(to_reqwest(method), url.as_str());
        for (name, value) in &headers {
            if is_multipart && name.eq_ignore_ascii_case("content-type") {
                debug!(value = %value, "multipart body sets its own content type");
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = attach_body(builder, body)?;
        }

        let response = builder.send().await?;
        let status = response.status();
        if redirect == RedirectMode::Error && is_redirect(status) {
            return Err(TransportError::Redirect(format!("{status} from {url}")));
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let status_text = reason_phrase(status, response.extensions());
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}

/// Statuses a browser would follow. `300` and `304` are plain responses.
fn is_redirect(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// The reason phrase the server sent, or the canonical one when it sent the
/// standard phrase (hyper only records non-canonical phrases).
fn reason_phrase(status: reqwest::StatusCode, extensions: &http::Extensions) -> String {
    extensions
        .get::<hyper::ext::ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .or_else(|| status.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn attach_body(
    builder: reqwest::RequestBuilder,
    body: Body,
) -> Result<reqwest::RequestBuilder, TransportError> {
    let builder = match body {
        Body::Json(value) => {
            let json = serde_json::to_vec(&value).map_err(|e| TransportError::Build(e.to_string()))?;
            builder.body(json)
        }
        Body::Text(text) => builder.body(text),
        Body::Bytes(bytes) => builder.body(bytes),
        Body::Blob(blob) => builder.body(blob.into_bytes()),
        Body::Form(pairs) => {
            let encoded =
                serde_urlencoded::to_string(&pairs).map_err(|e| TransportError::Build(e.to_string()))?;
            builder.body(encoded)
        }
        Body::Multipart(form) => builder.multipart(to_multipart(form)?),
        Body::Stream(stream) => builder.body(reqwest::Body::wrap_stream(stream)),
    };
    Ok(builder)
}

fn to_multipart(form: FormData) -> Result<reqwest::multipart::Form, TransportError> {
    let mut multipart = reqwest::multipart::Form::new();
    for (name, value) in form.into_entries() {
        multipart = match value {
            FormValue::Text(text) => multipart.text(name, text),
            FormValue::File { file_name, blob } => {
                let mime = blob.mime().to_string();
                let mut part =
                    reqwest::multipart::Part::bytes(blob.into_bytes().to_vec()).file_name(file_name);
                if !mime.is_empty() {
                    part = part.mime_str(&mime)?;
                }
                multipart.part(name, part)
            }
        };
    }
    Ok(multipart)
}
