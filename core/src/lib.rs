//! Synchronous fluent HTTP client core.
//!
//! # Overview
//! `RestClient` is a configured entry point (base URL, default headers,
//! transport, interceptors). Each call starts a fresh request builder,
//! `retrieve()` turns it into a `ResponseSpec`, and a terminal projection
//! (`body`, `to_entity`, `to_bodiless_entity`) executes the request, runs
//! status dispatch and decodes the result.
//!
//! # Design
//! - The network is behind the `Transport` trait (host-does-IO); closures are
//!   transports, so everything above it is testable with canned responses.
//! - Status dispatch is an ordered list of predicate/handler pairs with a
//!   4xx/5xx default policy.
//! - Builders are consumed by their terminal operation and a `ResponseSpec`
//!   executes at most once.
//! - `UserClient` and `HttpBinClient` are typed clients written against the
//!   facade.
//!
//! ```no_run
//! use restclient_core::{RequestHeadersSpec, RestClient, User};
//!
//! let client = RestClient::builder()
//!     .base_url("https://jsonplaceholder.typicode.com")
//!     .default_header("Accept", "application/json")
//!     .build();
//! let user: Option<User> = client.get().uri_vars("/users/{0}", &[&1]).retrieve().body()?;
//! # Ok::<(), restclient_core::RestClientError>(())
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod headers;
pub mod http;
pub mod httpbin;
pub mod interceptor;
pub mod request;
pub mod response;
pub mod status;
pub mod template;
pub mod transport;
pub mod types;
pub mod users;

pub use client::{RestClient, RestClientBuilder};
pub use config::{ClientProperties, HeaderProperty};
pub use entity::ResponseEntity;
pub use error::{BoxError, RestClientError, Result};
pub use headers::HttpHeaders;
pub use http::{HttpMethod, HttpRequest, HttpResponse, StatusCode};
pub use httpbin::HttpBinClient;
pub use interceptor::{Interceptor, LoggingInterceptor};
pub use request::{RequestBodySpec, RequestHeadersSpec, RequestSpec};
pub use response::ResponseSpec;
pub use status::StatusHandlers;
pub use template::{QueryArgument, QueryParams};
pub use transport::{Transport, TransportError, TransportErrorKind};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{HttpBinResponse, SearchQuery, User};
pub use users::{UserApiError, UserClient};
