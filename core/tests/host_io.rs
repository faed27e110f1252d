//! Host-does-IO test: the host executes requests with its own HTTP stack.
//!
//! # Design
//! Starts the mock server on a random port in a background thread, then
//! drives `build_request` and `parse_response` around a blocking ureq agent.
//! No part of `FetchIo` or reqwest is involved.

use fetch_io::{
    build_request, parse_response, Body, FailureKind, HttpMethod, HttpRequest, HttpResponse, Json,
    RequestOptions, ResponseMessage, FetchError, FromPayload,
};
use serde_json::{json, Value};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// 4xx/5xx responses are returned as data so `parse_response` interprets
/// the status.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let body = match req.body {
        Some(Body::Text(text)) => Some(text.into_bytes()),
        Some(Body::Bytes(bytes)) => Some(bytes.to_vec()),
        None => None,
        Some(other) => panic!("unsupported body in host test: {}", other.kind()),
    };
    let url = req.url.as_str();
    let headers = req.headers.as_slice();

    let result = match req.method {
        HttpMethod::Get => with_headers(agent.get(url), headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(url), headers).call(),
        HttpMethod::Head => with_headers(agent.head(url), headers).call(),
        HttpMethod::Options => with_headers(agent.options(url), headers).call(),
        HttpMethod::Post => send(with_headers(agent.post(url), headers), body),
        HttpMethod::Put => send(with_headers(agent.put(url), headers), body),
        HttpMethod::Patch => send(with_headers(agent.patch(url), headers), body),
    };
    let mut response = result.expect("HTTP transport error");

    let status = response.status();
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
    let body = response.body_mut().read_to_vec().unwrap_or_default();

    HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body: body.into(),
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<Vec<u8>>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(&bytes[..]),
        None => builder.send_empty(),
    }
}

fn call<T: FromPayload>(
    method: HttpMethod,
    url: &str,
    options: RequestOptions,
) -> Result<ResponseMessage<T>, FetchError> {
    let request = build_request(method, url, options)?;
    futures::executor::block_on(parse_response(execute(request)))
}

#[test]
fn host_driven_lifecycle() {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    let base = format!("http://{addr}");

    // filtered list
    let listed = call::<Value>(
        HttpMethod::Get,
        &format!("{base}/users"),
        RequestOptions::new().param("firstName", "John"),
    )
    .unwrap();
    assert_eq!(listed.status, 200);
    assert_eq!(listed.data.unwrap()["users"][0]["lastName"], "Maverick");

    // create
    let created = call::<Json<mock_server::User>>(
        HttpMethod::Post,
        &format!("{base}/users"),
        RequestOptions::new().body(json!({"id": "3", "firstName": "park", "lastName": "baek"})),
    )
    .unwrap();
    assert_eq!(created.into_data().unwrap().first_name, "park");

    // incomplete create is rejected
    let err = call::<Value>(
        HttpMethod::Put,
        &format!("{base}/users"),
        RequestOptions::new().body(json!({"id": "4"})),
    )
    .unwrap_err();
    assert_eq!(err.status, Some(400));
    assert_eq!(err.kind, FailureKind::Http);

    // patch then read back
    call::<Value>(
        HttpMethod::Patch,
        &format!("{base}/users"),
        RequestOptions::new().body(json!({"id": "3", "lastName": "kim"})),
    )
    .unwrap();
    let fetched = call::<Value>(HttpMethod::Get, &format!("{base}/users/3"), RequestOptions::new())
        .unwrap();
    assert_eq!(
        fetched.data,
        Some(json!({"user": {"id": "3", "firstName": "park", "lastName": "kim"}}))
    );

    // text decoding
    let text = call::<String>(HttpMethod::Get, &format!("{base}/fixtures/text"), RequestOptions::new())
        .unwrap();
    assert_eq!(text.data.as_deref(), Some("hello from the mock server"));

    // head and options
    let head = call::<Value>(HttpMethod::Head, &format!("{base}/"), RequestOptions::new()).unwrap();
    assert_eq!(head.status, 200);
    let options =
        call::<Value>(HttpMethod::Options, &format!("{base}/"), RequestOptions::new()).unwrap();
    assert_eq!(options.status, 200);

    // delete, then it is gone
    call::<Value>(HttpMethod::Delete, &format!("{base}/users/3"), RequestOptions::new()).unwrap();
    let err = call::<Value>(HttpMethod::Delete, &format!("{base}/users/3"), RequestOptions::new())
        .unwrap_err();
    assert_eq!(err.status, Some(404));
    assert_eq!(err.error, "Not Found");
}
