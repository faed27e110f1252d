//! Request building: query encoding, header merging, body serialization.

use crate::body::Body;
use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest};
use crate::options::RequestOptions;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Build the plain-data request for one call.
///
/// Structured bodies are serialized to JSON text here, so the transport only
/// ever sees raw payloads. Multipart bodies get no default `Content-Type`:
/// the transport must emit one carrying the part boundary.
pub fn build_request(
    method: HttpMethod,
    url: &str,
    options: RequestOptions,
) -> Result<HttpRequest, FetchError> {
    let RequestOptions {
        params,
        timeout,
        body,
        headers,
        native,
    } = options;

    let url = append_query(url, &params).map_err(FetchError::encode)?;

    let defaults: &[(&str, &str)] = match body {
        Some(Body::Multipart(_)) => &[],
        _ => &[(CONTENT_TYPE, JSON_CONTENT_TYPE)],
    };
    let headers = merge_headers(defaults, &headers);

    let body = match body {
        Some(body) if !body.is_raw() => Some(body.into_transport().map_err(FetchError::encode)?),
        raw => raw,
    };

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
        timeout,
        native,
    })
}

/// Append form-urlencoded `params` to `url`.
///
/// No params leaves the URL untouched. An existing query is extended with
/// `&`, and a `#fragment` stays last.
pub fn append_query(
    url: &str,
    params: &[(String, String)],
) -> Result<String, serde_urlencoded::ser::Error> {
    if params.is_empty() {
        return Ok(url.to_string());
    }
    let query = serde_urlencoded::to_string(params)?;

    let (base, fragment) = match url.find('#') {
        Some(at) => url.split_at(at),
        None => (url, ""),
    };
    let separator = match base.find('?') {
        None => "?",
        Some(_) if base.ends_with('?') || base.ends_with('&') => "",
        Some(_) => "&",
    };
    Ok(format!("{base}{separator}{query}{fragment}"))
}

/// Overlay `caller` headers on `defaults`.
///
/// A default is dropped when the caller sets the same name in any casing.
/// Caller headers are kept as given, repeats included.
pub fn merge_headers(defaults: &[(&str, &str)], caller: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .filter(|(name, _)| !caller.iter().any(|(set, _)| set.eq_ignore_ascii_case(name)))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    merged.extend(caller.iter().cloned());
    merged
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::options::RedirectMode;
    use crate::payload::FormData;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_params_leave_url_alone() {
        let url = append_query("https://example.com/users", &[]).unwrap();
        assert_eq!(url, "https://example.com/users");
    }

    #[test]
    fn params_are_percent_encoded() {
        let url = append_query(
            "https://example.com/users",
            &pairs(&[("firstName", "John Paul"), ("q", "a&b=c/ü")]),
        )
        .unwrap();
        assert_eq!(
            url,
            "https://example.com/users?firstName=John+Paul&q=a%26b%3Dc%2F%C3%BC"
        );
    }

    #[test]
    fn repeated_keys_are_kept_in_order() {
        let url = append_query("/search", &pairs(&[("tag", "a"), ("tag", "b")])).unwrap();
        assert_eq!(url, "/search?tag=a&tag=b");
    }

    #[test]
    fn existing_query_and_fragment() {
        let params = pairs(&[("page", "2")]);
        assert_eq!(append_query("/u?sort=asc", &params).unwrap(), "/u?sort=asc&page=2");
        assert_eq!(append_query("/u?", &params).unwrap(), "/u?page=2");
        assert_eq!(append_query("/u#top", &params).unwrap(), "/u?page=2#top");
    }

    #[test]
    fn caller_headers_override_defaults_ignoring_case() {
        let merged = merge_headers(
            &[(CONTENT_TYPE, JSON_CONTENT_TYPE)],
            &pairs(&[("content-type", "text/plain"), ("X-Trace", "1")]),
        );
        assert_eq!(merged, pairs(&[("content-type", "text/plain"), ("X-Trace", "1")]));
    }

    #[test]
    fn repeated_caller_headers_are_all_kept() {
        let merged = merge_headers(
            &[(CONTENT_TYPE, JSON_CONTENT_TYPE)],
            &pairs(&[("Accept", "a"), ("accept", "b")]),
        );
        assert_eq!(
            merged,
            pairs(&[("Content-Type", "application/json"), ("Accept", "a"), ("accept", "b")])
        );
    }

    #[test]
    fn default_content_type_is_json() {
        let req = build_request(HttpMethod::Get, "https://example.com", RequestOptions::new()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://example.com");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.body.is_none());
        assert!(req.timeout.is_none());
    }

    #[test]
    fn structured_body_is_serialized() {
        let options = RequestOptions::new().body(json!({
            "id": "3",
            "firstName": "park",
            "lastName": "baek",
        }));
        let req = build_request(HttpMethod::Post, "https://example.com/users", options).unwrap();
        let Some(Body::Text(text)) = &req.body else {
            panic!("expected JSON text body, got {:?}", req.body);
        };
        let body: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["id"], "3");
        assert_eq!(body["firstName"], "park");
        assert_eq!(body["lastName"], "baek");
    }

    #[test]
    fn raw_bytes_pass_through() {
        let options = RequestOptions::new().body(vec![0u8, 159, 146, 150]);
        let req = build_request(HttpMethod::Put, "/upload", options).unwrap();
        assert!(matches!(req.body, Some(Body::Bytes(ref b)) if b[..] == [0u8, 159, 146, 150]));
    }

    #[test]
    fn multipart_body_has_no_default_content_type() {
        let options = RequestOptions::new().body(FormData::new().text("a", "b"));
        let req = build_request(HttpMethod::Post, "/form", options).unwrap();
        assert!(req.header("content-type").is_none());
        assert!(matches!(req.body, Some(Body::Multipart(_))));
    }

    #[test]
    fn timeout_params_and_native_options_are_carried() {
        let options = RequestOptions::new()
            .param("firstName", "John")
            .timeout(Duration::from_millis(10))
            .redirect(RedirectMode::Error);
        let req = build_request(HttpMethod::Get, "https://example.com/users", options).unwrap();
        assert_eq!(req.url, "https://example.com/users?firstName=John");
        assert_eq!(req.timeout, Some(Duration::from_millis(10)));
        assert_eq!(req.native.redirect, Some(RedirectMode::Error));
    }
}
