//! Response parsing and the normalized success shape.

use serde::Serialize;
use tracing::debug;

use crate::decode::{decode_body, ContentKind};
use crate::error::FetchError;
use crate::http::{find_header, HttpResponse};
use crate::payload::FromPayload;

/// The normalized result of a call.
///
/// A successful call carries `data`; `error` is only set when a
/// [`FetchError`] is folded back into this shape with `From`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMessage<T> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ResponseMessage<T> {
    pub fn success(status: u16, data: T) -> Self {
        Self {
            status,
            data: Some(data),
            error: None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseMessage<U> {
        ResponseMessage {
            status: self.status,
            data: self.data.map(f),
            error: self.error,
        }
    }
}

impl<T> From<FetchError> for ResponseMessage<T> {
    fn from(err: FetchError) -> Self {
        Self {
            status: err.status_code(),
            data: None,
            error: Some(err.error),
        }
    }
}

/// Decode a response and normalize it.
///
/// The body is always decoded by its content type, even for a failing
/// status. On a non-2xx status the decoded value (or decode error) is
/// dropped and the call fails with the status text.
pub async fn parse_response<T: FromPayload>(
    response: HttpResponse,
) -> Result<ResponseMessage<T>, FetchError> {
    let success = response.is_success();
    let HttpResponse {
        status,
        status_text,
        headers,
        body,
    } = response;

    let content_type = find_header(&headers, "content-type");
    let kind = ContentKind::from_content_type(content_type);
    let decoded = decode_body(kind, content_type, body).await;

    if !success {
        match &decoded {
            Ok(payload) => debug!(status, kind = payload.kind(), "discarding error response body"),
            Err(err) => debug!(status, error = %err, "error response body did not decode"),
        }
        return Err(FetchError::http(status, status_text));
    }

    let payload = decoded.map_err(|err| FetchError::decode(status, err))?;
    let data = T::from_payload(payload).map_err(|err| FetchError::decode(status, err))?;
    Ok(ResponseMessage::success(status, data))
}
