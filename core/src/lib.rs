//! Verb-based HTTP request helper.
//!
//! # Overview
//! `FetchIo` exposes `get`, `post`, `put`, `patch`, `delete`, `head` and
//! `options` over a pluggable transport. Every call encodes its query
//! parameters, serializes structured bodies to JSON, enforces an optional
//! timeout, decodes the response by its `content-type`, and resolves to a
//! uniform `ResponseMessage` or `FetchError`.
//!
//! # Design
//! - Stateless: `FetchIo` holds only its transport; `fetch_io()` returns a
//!   shared instance over `reqwest`.
//! - Host-does-IO: `build_request` and `parse_response` are usable on their
//!   own, so any HTTP stack can sit between them.
//! - One failure shape: transport, timeout, HTTP and decode failures all
//!   surface as `FetchError { status, error }`.
//!
//! ```no_run
//! use fetch_io::{fetch_io, Json, RequestOptions};
//! use serde_json::Value;
//!
//! # async fn run() -> Result<(), fetch_io::FetchError> {
//! let options = RequestOptions::new().param("firstName", "John").timeout_ms(2_000);
//! let response = fetch_io()
//!     .get::<Json<Value>>("https://example.com/users", Some(options))
//!     .await?;
//! println!("{} {:?}", response.status, response.data);
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod options;
pub mod payload;
pub mod request;
pub mod response;
pub mod transport;

pub use self::body::{Body, ByteStream};
#[cfg(feature = "reqwest")]
pub use self::client::fetch_io;
pub use self::client::FetchIo;
pub use self::decode::{decode_body, ContentKind};
pub use self::error::{DecodeError, FailureKind, FetchError, TransportError};
pub use self::http::{HttpMethod, HttpRequest, HttpResponse};
pub use self::options::{NativeOptions, RedirectMode, RequestOptions};
pub use self::payload::{Blob, FormData, FormValue, FromPayload, Json, Payload};
pub use self::request::{append_query, build_request, merge_headers};
pub use self::response::{parse_response, ResponseMessage};
#[cfg(feature = "reqwest")]
pub use self::transport::ReqwestTransport;
pub use self::transport::Transport;
