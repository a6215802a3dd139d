//! Per-call request builders.
//!
//! # Design
//! `RequestHeadersSpec` carries everything every builder can do (URI,
//! headers, query parameters, terminal operations) as provided methods over
//! two required accessors. `RequestSpec` implements it directly and is what
//! `get`, `delete`, `head` and `options` return. `RequestBodySpec` wraps a
//! `RequestSpec` and adds body setters; `post`, `put`, `patch` and `method`
//! return it.
//!
//! Terminal operations take the builder by value, so a dispatched request can
//! no longer be mutated or dispatched again.

use std::fmt::Display;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ClientInner, ExecutionError};
use crate::codec::{self, Payload};
use crate::entity::ResponseEntity;
use crate::error::{BoxError, RestClientError, Result};
use crate::headers::{HttpHeaders, CONTENT_TYPE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::ResponseSpec;
use crate::template::{self, QueryArgument, QueryParams};

/// A request under construction.
pub struct RequestSpec {
    client: Arc<ClientInner>,
    method: HttpMethod,
    uri: String,
    query: QueryParams,
    headers: HttpHeaders,
    body: Option<Payload>,
    body_error: Option<String>,
}

impl RequestSpec {
    pub(crate) fn new(client: Arc<ClientInner>, method: HttpMethod) -> Self {
        let headers = client.default_headers.clone();
        Self {
            client,
            method,
            uri: String::new(),
            query: QueryParams::new(),
            headers,
            body: None,
            body_error: None,
        }
    }

    pub fn http_method(&self) -> HttpMethod {
        self.method
    }

    /// The URI as configured so far, before joining with the base URL.
    pub fn current_uri(&self) -> &str {
        &self.uri
    }

    pub fn current_headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// The absolute URL this request will be sent to.
    pub fn url(&self) -> String {
        let joined = template::join_url(&self.client.base_url, &self.uri);
        self.query.append_to(&joined)
    }

    fn set_body(&mut self, payload: std::result::Result<Payload, RestClientError>) {
        match payload {
            Ok(payload) => {
                self.body = Some(payload);
                self.body_error = None;
            }
            Err(err) => {
                self.body = None;
                self.body_error = Some(err.to_string());
            }
        }
    }

    /// Freeze the builder into a wire request.
    pub(crate) fn into_request(
        self,
    ) -> (Arc<ClientInner>, std::result::Result<HttpRequest, ExecutionError>) {
        let url = self.url();
        let RequestSpec {
            client,
            method,
            mut headers,
            body,
            body_error,
            ..
        } = self;

        if let Some(msg) = body_error {
            return (client, Err(ExecutionError::Serialization(msg)));
        }

        let body = match body {
            Some(payload) => {
                if !headers.contains(CONTENT_TYPE) {
                    headers.set_content_type(payload.content_type());
                }
                match payload.encode() {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        return (client, Err(ExecutionError::Serialization(err.to_string())));
                    }
                }
            }
            None => None,
        };

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };
        (client, Ok(request))
    }
}

/// The operations shared by every request builder.
pub trait RequestHeadersSpec: Sized {
    #[doc(hidden)]
    fn spec_mut(&mut self) -> &mut RequestSpec;

    #[doc(hidden)]
    fn into_spec(self) -> RequestSpec;

    /// Set the URI verbatim. Later calls overwrite earlier ones.
    fn uri(mut self, uri: impl Into<String>) -> Self {
        self.spec_mut().uri = uri.into();
        self
    }

    /// Set the URI from a template with positional `{0}`, `{1}`, … tokens.
    fn uri_vars(mut self, template: &str, args: &[&dyn Display]) -> Self {
        self.spec_mut().uri = template::expand_positional(template, args);
        self
    }

    /// Set the URI from a template with named `{name}` tokens.
    fn uri_named(mut self, template: &str, vars: &[(&str, &dyn Display)]) -> Self {
        self.spec_mut().uri = template::expand_named(template, vars);
        self
    }

    /// Append a header value.
    fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec_mut().headers.add(name, value);
        self
    }

    /// Append several values for one header name.
    fn header_values<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.spec_mut().headers.add(name, value);
        }
        self
    }

    /// Merge every pair of `headers` into this request.
    fn headers(mut self, headers: &HttpHeaders) -> Self {
        self.spec_mut().headers.extend_from(headers);
        self
    }

    /// Edit this request's headers in place.
    fn headers_with(mut self, f: impl FnOnce(&mut HttpHeaders)) -> Self {
        f(&mut self.spec_mut().headers);
        self
    }

    fn accept(mut self, media_type: &str) -> Self {
        self.spec_mut().headers.set_accept(media_type);
        self
    }

    fn query_param(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.spec_mut().query.add(name, value.to_string());
        self
    }

    /// Let `argument` contribute its query parameters.
    fn query_args<A: QueryArgument + ?Sized>(mut self, argument: &A) -> Self {
        argument.resolve(&mut self.spec_mut().query);
        self
    }

    /// Prepare the request for one of the projections on [`ResponseSpec`].
    /// Nothing is sent until a projection is called.
    fn retrieve(self) -> ResponseSpec {
        let (client, request) = self.into_spec().into_request();
        ResponseSpec::new(client, request)
    }

    /// Send the request and hand the raw exchange to `f`.
    ///
    /// No status dispatch happens: a 4xx or 5xx response only fails the call
    /// if `f` returns an error.
    fn exchange<R, F>(self, f: F) -> Result<R>
    where
        F: FnOnce(&HttpRequest, &HttpResponse) -> std::result::Result<R, BoxError>,
    {
        let (client, request) = self.into_spec().into_request();
        let exchange = client.execute(request?)?;
        f(&exchange.request, &exchange.response).map_err(RestClientError::Handler)
    }

    /// Send the request and decode the response into an envelope, whatever
    /// its status.
    fn exchange_entity<T: DeserializeOwned>(self) -> Result<ResponseEntity<T>> {
        let (client, request) = self.into_spec().into_request();
        let exchange = client.execute(request?)?;
        let response = exchange.response;
        let body = codec::decode(&response.body, response.headers.content_type())?;
        Ok(ResponseEntity::new(body, response.headers, response.status))
    }
}

impl RequestHeadersSpec for RequestSpec {
    fn spec_mut(&mut self) -> &mut RequestSpec {
        self
    }

    fn into_spec(self) -> RequestSpec {
        self
    }
}

/// A request builder that can also carry a body.
pub struct RequestBodySpec {
    inner: RequestSpec,
}

impl RequestBodySpec {
    pub(crate) fn new(inner: RequestSpec) -> Self {
        Self { inner }
    }

    pub fn content_type(mut self, media_type: &str) -> Self {
        self.inner.headers.set_content_type(media_type);
        self
    }

    /// Serialize `value` as JSON. Replaces any previous body.
    ///
    /// Serialization errors surface from the terminal operation.
    pub fn body<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.inner.set_body(Payload::json(value));
        self
    }

    /// Serialize `value` as `application/x-www-form-urlencoded`.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.inner.set_body(Payload::form(value));
        self
    }

    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.inner.set_body(Ok(Payload::Text(text.into())));
        self
    }

    pub fn body_bytes(mut self, content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.inner.set_body(Ok(Payload::Bytes {
            content_type: content_type.into(),
            data: data.into(),
        }));
        self
    }

    pub fn http_method(&self) -> HttpMethod {
        self.inner.http_method()
    }

    pub fn current_uri(&self) -> &str {
        self.inner.current_uri()
    }

    pub fn current_headers(&self) -> &HttpHeaders {
        self.inner.current_headers()
    }

    pub fn url(&self) -> String {
        self.inner.url()
    }
}

impl RequestHeadersSpec for RequestBodySpec {
    fn spec_mut(&mut self) -> &mut RequestSpec {
        &mut self.inner
    }

    fn into_spec(self) -> RequestSpec {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RestClient;
    use crate::headers::{APPLICATION_FORM_URLENCODED, APPLICATION_JSON};
    use crate::http::StatusCode;
    use crate::transport::TransportError;

    fn client() -> RestClient {
        RestClient::builder()
            .base_url("https://api.test")
            .default_header("Accept", "application/json")
            .transport(|_: &HttpRequest| {
                Ok::<_, TransportError>(HttpResponse::new(StatusCode::NO_CONTENT))
            })
            .build()
    }

    fn freeze(spec: impl RequestHeadersSpec) -> HttpRequest {
        spec.into_spec().into_request().1.unwrap()
    }

    #[test]
    fn builder_starts_with_copy_of_defaults() {
        let spec = client().get().header("Accept", "text/plain");
        assert_eq!(
            spec.current_headers().get("Accept"),
            ["application/json", "text/plain"]
        );
        assert_eq!(client().get().current_headers().get("Accept"), ["application/json"]);
    }

    #[test]
    fn headers_with_can_replace_defaults() {
        let request = freeze(client().get().headers_with(|h| h.set("Accept", "text/csv")));
        assert_eq!(request.headers.get("Accept"), ["text/csv"]);
    }

    #[test]
    fn last_uri_call_wins() {
        let spec = client().get().uri("/a").uri_vars("/b/{0}", &[&1]);
        assert_eq!(spec.current_uri(), "/b/1");
        assert_eq!(spec.url(), "https://api.test/b/1");
    }

    #[test]
    fn query_params_are_appended_to_url() {
        let spec = client()
            .get()
            .uri_named("/users/search?name={name}", &[("name", &"Jo")])
            .query_param("minAge", 21);
        assert_eq!(spec.url(), "https://api.test/users/search?name=Jo&minAge=21");
    }

    #[test]
    fn json_body_sets_content_type() {
        let request = freeze(client().post().uri("/users").body(&serde_json::json!({"name": "Alice"})));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.content_type(), Some(APPLICATION_JSON));
        assert_eq!(request.body.as_deref(), Some(br#"{"name":"Alice"}"#.as_slice()));
    }

    #[test]
    fn explicit_content_type_is_kept() {
        let request = freeze(
            client()
                .post()
                .content_type("application/vnd.api+json")
                .body(&serde_json::json!({})),
        );
        assert_eq!(request.headers.get(CONTENT_TYPE), ["application/vnd.api+json"]);
    }

    #[test]
    fn last_body_wins() {
        let request = freeze(
            client()
                .put()
                .body(&serde_json::json!({"a": 1}))
                .form(&vec![("name", "Jo")]),
        );
        assert_eq!(request.headers.content_type(), Some(APPLICATION_FORM_URLENCODED));
        assert_eq!(request.body.as_deref(), Some(b"name=Jo".as_slice()));
    }

    #[test]
    fn serialization_failure_is_deferred() {
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], "non-string keys cannot be JSON object keys");
        let (_, request) = client().post().body(&bad).into_spec().into_request();
        assert!(matches!(request, Err(ExecutionError::Serialization(_))));
    }

    #[test]
    fn no_body_means_no_content_type() {
        let request = freeze(client().delete().uri("/users/1"));
        assert!(request.body.is_none());
        assert!(!request.headers.contains(CONTENT_TYPE));
    }
}
