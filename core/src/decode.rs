//! Content-type dispatch for response bodies.
//!
//! The `content-type` header is matched case-insensitively by substring, in
//! a fixed precedence order. A missing or unrecognised header decodes as
//! JSON.

use std::convert::Infallible;

use bytes::Bytes;

use crate::error::DecodeError;
use crate::payload::{Blob, FormData, FormValue, Payload};

/// Decoding strategy selected from a `content-type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Json,
    Text,
    Blob,
    OctetStream,
    FormData,
}

impl ContentKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return ContentKind::Json;
        };
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("application/json") {
            ContentKind::Json
        } else if content_type.contains("text/") {
            ContentKind::Text
        } else if content_type.contains("application/blob") {
            ContentKind::Blob
        } else if content_type.contains("application/octet-stream") {
            ContentKind::OctetStream
        } else if content_type.contains("multipart/form-data") {
            ContentKind::FormData
        } else {
            ContentKind::Json
        }
    }
}

/// Decode a buffered body.
///
/// An empty body yields `Payload::Empty` for JSON and form data (HEAD
/// responses, `204`), and the natural empty value for the other kinds.
/// Text is decoded lossily, as a browser would.
pub async fn decode_body(
    kind: ContentKind,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<Payload, DecodeError> {
    match kind {
        ContentKind::Json if body.is_empty() => Ok(Payload::Empty),
        ContentKind::Json => Ok(Payload::Json(serde_json::from_slice(&body)?)),
        ContentKind::Text => Ok(Payload::Text(String::from_utf8_lossy(&body).into_owned())),
        ContentKind::Blob => {
            let mime = content_type.unwrap_or_default().to_ascii_lowercase();
            Ok(Payload::Blob(Blob::new(body, mime)))
        }
        ContentKind::OctetStream => Ok(Payload::Bytes(body)),
        ContentKind::FormData if body.is_empty() => Ok(Payload::Empty),
        ContentKind::FormData => {
            let form = decode_form_data(content_type.unwrap_or_default(), body).await?;
            Ok(Payload::FormData(form))
        }
    }
}

async fn decode_form_data(content_type: &str, body: Bytes) -> Result<FormData, DecodeError> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = FormData::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let mime = field
            .content_type()
            .map(ToString::to_string)
            .unwrap_or_default();
        let bytes = field.bytes().await?;

        let value = match file_name {
            Some(file_name) => FormValue::File {
                file_name,
                blob: Blob::new(bytes, mime),
            },
            None => FormValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
        };
        form.append(name, value);
    }
    Ok(form)
}
