use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get, head},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Boundary used by the multipart fixture.
pub const FORM_BOUNDARY: &str = "mock-server-boundary";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

/// Incoming user fields. Absent and empty strings both count as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserInput {
    fn id(&self) -> Option<&str> {
        present(&self.id)
    }

    fn complete(self) -> Option<User> {
        Some(User {
            id: present(&self.id)?.to_string(),
            first_name: present(&self.first_name)?.to_string(),
            last_name: present(&self.last_name)?.to_string(),
        })
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct UserFilter {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Delay {
    #[serde(default)]
    pub ms: u64,
}

pub type Db = Arc<RwLock<Vec<User>>>;

pub fn seed_users() -> Vec<User> {
    vec![User {
        id: "1".to_string(),
        first_name: "John".to_string(),
        last_name: "Maverick".to_string(),
    }]
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed_users()));
    Router::new()
        .route("/", head(head_root).options(options_root))
        .route(
            "/users",
            get(list_users)
                .post(store_user)
                .put(store_user)
                .patch(patch_user),
        )
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/echo", any(echo))
        .route("/fixtures/text", get(text_fixture))
        .route("/fixtures/bytes", get(bytes_fixture))
        .route("/fixtures/blob", get(blob_fixture))
        .route("/fixtures/form", get(form_fixture))
        .route("/fixtures/malformed", get(malformed_fixture))
        .route("/fixtures/untyped", get(untyped_fixture))
        .route("/fixtures/failure", get(failure_fixture))
        .route("/fixtures/bad-gateway", get(bad_gateway_fixture))
        .route("/fixtures/redirect", get(redirect_fixture))
        .route("/fixtures/not-modified", get(not_modified_fixture))
        .route("/fixtures/slow", get(slow_fixture))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn null(status: StatusCode) -> Response {
    (status, Json(Value::Null)).into_response()
}

async fn list_users(State(db): State<Db>, Query(filter): Query<UserFilter>) -> Json<Value> {
    let users = db.read().await;
    let users: Vec<&User> = users
        .iter()
        .filter(|user| {
            filter
                .first_name
                .as_deref()
                .map_or(true, |name| user.first_name == name)
        })
        .collect();
    Json(json!({ "users": users }))
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let users = db.read().await;
    match users.iter().find(|user| user.id == id) {
        Some(user) => Json(json!({ "user": user })).into_response(),
        None => null(StatusCode::NOT_FOUND),
    }
}

/// POST and PUT: every field is required; the user is stored and echoed.
async fn store_user(State(db): State<Db>, Json(input): Json<UserInput>) -> Response {
    let Some(user) = input.complete() else {
        return null(StatusCode::BAD_REQUEST);
    };
    let mut users = db.write().await;
    match users.iter_mut().find(|existing| existing.id == user.id) {
        Some(existing) => *existing = user.clone(),
        None => users.push(user.clone()),
    }
    tracing::debug!(id = %user.id, "stored user");
    Json(user).into_response()
}

async fn patch_user(State(db): State<Db>, Json(input): Json<UserInput>) -> Response {
    let Some(id) = input.id() else {
        return null(StatusCode::BAD_REQUEST);
    };
    if present(&input.first_name).is_none() && present(&input.last_name).is_none() {
        return null(StatusCode::BAD_REQUEST);
    }
    let mut users = db.write().await;
    let Some(user) = users.iter_mut().find(|user| user.id == id) else {
        return null(StatusCode::NOT_FOUND);
    };
    if let Some(first_name) = present(&input.first_name) {
        user.first_name = first_name.to_string();
    }
    if let Some(last_name) = present(&input.last_name) {
        user.last_name = last_name.to_string();
    }
    Json(json!({ "user": user })).into_response()
}

async fn delete_user(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut users = db.write().await;
    let before = users.len();
    users.retain(|user| user.id != id);
    if users.len() == before {
        return null(StatusCode::NOT_FOUND);
    }
    null(StatusCode::OK)
}

async fn head_root() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::LAST_MODIFIED, "Mon, 13 Jul 2020 15:00:00 GMT"),
        ],
        StatusCode::OK,
    )
}

async fn options_root() -> impl IntoResponse {
    (
        [(header::ALLOW, "GET,POST,PUT,PATCH,DELETE,HEAD,OPTIONS")],
        Json(Value::Null),
    )
}

/// Reflects the request back as JSON so callers can inspect what was sent.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), Value::String(value.to_string())))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "query": uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn text_fixture() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "hello from the mock server",
    )
}

async fn bytes_fixture() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        vec![0u8, 1, 2, 254, 255],
    )
}

async fn blob_fixture() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/blob")], &b"blob-bytes"[..])
}

async fn form_fixture() -> impl IntoResponse {
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"firstName\"\r\n\r\n\
         John\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"avatar\"; filename=\"avatar.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{b}--\r\n",
        b = FORM_BOUNDARY
    );
    (
        [(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={FORM_BOUNDARY}"),
        )],
        body,
    )
}

async fn malformed_fixture() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"users": ["#)
}

/// JSON body sent without any `content-type` header.
async fn untyped_fixture() -> Response {
    Response::new(Body::from(r#"{"untyped":true}"#))
}

async fn failure_fixture() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "database unavailable" })),
    )
}

/// Error status whose body does not match its declared content type.
async fn bad_gateway_fixture() -> impl IntoResponse {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "application/json")],
        "<html>bad gateway</html>",
    )
}

async fn redirect_fixture() -> Redirect {
    Redirect::temporary("/users")
}

async fn not_modified_fixture() -> StatusCode {
    StatusCode::NOT_MODIFIED
}

async fn slow_fixture(Query(delay): Query<Delay>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(delay.ms)).await;
    Json(json!({ "sleptMs": delay.ms }))
}
