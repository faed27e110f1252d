//! Decoded response payloads and the values shared with request bodies.
//!
//! # Design
//! Decoding happens in two steps. The content type picks a [`Payload`]
//! variant (see [`decode`](crate::decode)); the caller's type parameter then
//! converts that payload through [`FromPayload`]. Typed JSON goes through the
//! [`Json`] wrapper so that `String`, `Bytes` and friends keep their own,
//! non-JSON conversions.

use std::ops::{Deref, DerefMut};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;

/// Binary data tagged with a MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    mime: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// MIME type, empty when unknown.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// A single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File { file_name: String, blob: Blob },
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File { .. } => None,
        }
    }

    pub fn as_file(&self) -> Option<(&str, &Blob)> {
        match self {
            FormValue::File { file_name, blob } => Some((file_name, blob)),
            FormValue::Text(_) => None,
        }
    }
}

/// Ordered multipart form fields. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, FormValue::Text(value.into()));
        self
    }

    /// Builder-style file field.
    pub fn file(mut self, name: impl Into<String>, file_name: impl Into<String>, blob: Blob) -> Self {
        self.append(
            name,
            FormValue::File {
                file_name: file_name.into(),
                blob,
            },
        );
        self
    }

    pub fn append(&mut self, name: impl Into<String>, value: FormValue) {
        self.entries.push((name.into(), value));
    }

    /// First field with the given name.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(String, FormValue)> {
        self.entries
    }
}

/// A response body decoded according to its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body was empty where a structured payload was expected.
    Empty,
    Json(Value),
    Text(String),
    Blob(Blob),
    Bytes(Bytes),
    FormData(FormData),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Json(_) => "json",
            Payload::Text(_) => "text",
            Payload::Blob(_) => "blob",
            Payload::Bytes(_) => "bytes",
            Payload::FormData(_) => "form data",
        }
    }
}

/// Conversion from a decoded [`Payload`] into the caller's data type.
pub trait FromPayload: Sized {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError>;
}

fn unexpected(expected: &'static str, found: &Payload) -> DecodeError {
    DecodeError::Unexpected {
        expected,
        found: found.kind(),
    }
}

impl FromPayload for Payload {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError> {
        Ok(payload)
    }
}

/// Discards the body.
impl FromPayload for () {
    fn from_payload(_: Payload) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl FromPayload for Value {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError> {
        match payload {
            Payload::Json(value) => Ok(value),
            Payload::Empty => Ok(Value::Null),
            Payload::Text(text) => Ok(Value::String(text)),
            other => Err(unexpected("json", &other)),
        }
    }
}

impl FromPayload for String {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError> {
        match payload {
            Payload::Text(text) => Ok(text),
            Payload::Json(Value::String(text)) => Ok(text),
            Payload::Empty => Ok(String::new()),
            Payload::Bytes(bytes) => Ok(String::from_utf8(bytes.to_vec())?),
            other => Err(unexpected("text", &other)),
        }
    }
}

impl FromPayload for Bytes {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError> {
        match payload {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Blob(blob) => Ok(blob.into_bytes()),
            Payload::Text(text) => Ok(Bytes::from(text)),
            Payload::Empty => Ok(Bytes::new()),
            other => Err(unexpected("bytes", &other)),
        }
    }
}

impl FromPayload for Blob {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError> {
        match payload {
            Payload::Blob(blob) => Ok(blob),
            Payload::Bytes(bytes) => Ok(Blob::new(bytes, "")),
            Payload::Empty => Ok(Blob::default()),
            other => Err(unexpected("blob", &other)),
        }
    }
}

impl FromPayload for FormData {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError> {
        match payload {
            Payload::FormData(form) => Ok(form),
            Payload::Empty => Ok(FormData::default()),
            other => Err(unexpected("form data", &other)),
        }
    }
}

/// Typed JSON data: `Json<T>` deserializes the payload into `T`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DeserializeOwned> FromPayload for Json<T> {
    fn from_payload(payload: Payload) -> Result<Self, DecodeError> {
        let value = match payload {
            Payload::Json(value) => serde_json::from_value(value)?,
            Payload::Empty => serde_json::from_value(Value::Null)?,
            Payload::Text(text) => serde_json::from_str(&text)?,
            Payload::Bytes(bytes) => serde_json::from_slice(&bytes)?,
            other => return Err(unexpected("json", &other)),
        };
        Ok(Json(value))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        message: String,
    }

    #[test]
    fn json_wrapper_deserializes_object() {
        let payload = Payload::Json(json!({"message": "hi"}));
        let Json(greeting) = Json::<Greeting>::from_payload(payload).unwrap();
        assert_eq!(greeting.message, "hi");
    }

    #[test]
    fn json_wrapper_accepts_empty_for_option() {
        let Json(value) = Json::<Option<Greeting>>::from_payload(Payload::Empty).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn json_wrapper_rejects_shape_mismatch() {
        let err = Json::<Greeting>::from_payload(Payload::Json(json!([1, 2]))).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn string_from_text_and_json_string() {
        assert_eq!(String::from_payload(Payload::Text("a".into())).unwrap(), "a");
        assert_eq!(String::from_payload(Payload::Json(json!("b"))).unwrap(), "b");
    }

    #[test]
    fn string_rejects_form_data() {
        let err = String::from_payload(Payload::FormData(FormData::new())).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Unexpected { expected: "text", found: "form data" }
        ));
    }

    #[test]
    fn bytes_from_blob_drops_mime() {
        let blob = Blob::new(vec![1u8, 2, 3], "application/blob");
        let bytes = Bytes::from_payload(Payload::Blob(blob)).unwrap();
        assert_eq!(&bytes[..], &[1, 2, 3]);
    }

    #[test]
    fn value_from_empty_is_null() {
        assert_eq!(Value::from_payload(Payload::Empty).unwrap(), Value::Null);
    }

    #[test]
    fn form_data_keeps_order_and_repeats() {
        let form = FormData::new()
            .text("tag", "a")
            .file("upload", "x.bin", Blob::new(vec![0u8], "application/octet-stream"))
            .text("tag", "b");
        assert_eq!(form.len(), 3);
        assert_eq!(form.get("tag").and_then(FormValue::as_text), Some("a"));
        let tags: Vec<_> = form.get_all("tag").filter_map(FormValue::as_text).collect();
        assert_eq!(tags, ["a", "b"]);
        let (file_name, blob) = form.get("upload").and_then(FormValue::as_file).unwrap();
        assert_eq!(file_name, "x.bin");
        assert_eq!(blob.mime(), "application/octet-stream");
    }

    #[test]
    fn get_result_outlives_the_lookup_key() {
        let form = FormData::new().text("firstName", "John");
        let value = {
            let key = String::from("firstName");
            form.get(&key)
        };
        assert_eq!(value.and_then(FormValue::as_text), Some("John"));
    }
}
