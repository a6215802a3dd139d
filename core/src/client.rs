//! The client facade and its builder.
//!
//! # Design
//! A `RestClient` is an immutable bundle of base URL, default headers,
//! transport, interceptors and default status handlers behind an `Arc`, so it
//! is cheap to clone and safe to share between threads. Every entry point
//! (`get`, `post`, …) hands out a fresh request builder holding its own copy
//! of the default headers; nothing a builder does can reach back into the
//! client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientProperties;
use crate::error::{BoxError, RestClientError};
use crate::headers::HttpHeaders;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, StatusCode};
use crate::interceptor::Interceptor;
use crate::request::{RequestBodySpec, RequestSpec};
use crate::status::StatusHandlers;
use crate::transport::{Transport, TransportError};

/// A request/response pair as seen after all interceptors ran.
#[derive(Debug, Clone)]
pub(crate) struct Exchange {
    pub(crate) request: HttpRequest,
    pub(crate) response: HttpResponse,
}

/// Failure before a response was obtained. `Clone` so a cached outcome can be
/// reported again by every terminal projection.
#[derive(Debug, Clone)]
pub(crate) enum ExecutionError {
    Serialization(String),
    Interceptor(String),
    Transport(TransportError),
}

impl From<ExecutionError> for RestClientError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Serialization(msg) => RestClientError::Serialization(msg),
            ExecutionError::Interceptor(msg) => RestClientError::Interceptor(msg),
            ExecutionError::Transport(err) => RestClientError::Transport(err),
        }
    }
}

pub(crate) struct ClientInner {
    pub(crate) base_url: String,
    pub(crate) default_headers: HttpHeaders,
    transport: Arc<dyn Transport>,
    /// Set only when the caller supplied the transport; `mutate` carries it
    /// over, while a built-in one is rebuilt from `timeout`.
    custom_transport: Option<Arc<dyn Transport>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    pub(crate) status_handlers: StatusHandlers,
    timeout: Option<Duration>,
}

impl ClientInner {
    /// Run `request` through the interceptors and the transport.
    pub(crate) fn execute(&self, request: HttpRequest) -> Result<Exchange, ExecutionError> {
        let mut request = request;
        for interceptor in &self.interceptors {
            request = interceptor
                .intercept_request(request)
                .map_err(ExecutionError::Interceptor)?;
        }

        tracing::debug!(method = %request.method, url = %request.url, "Sending HTTP request");

        let mut response = self.transport.execute(&request).map_err(|err| {
            tracing::debug!(method = %request.method, url = %request.url, error = %err, "Transport failed");
            ExecutionError::Transport(err)
        })?;

        tracing::debug!(status = %response.status, bytes = response.body.len(), "Received HTTP response");

        for interceptor in self.interceptors.iter().rev() {
            response = interceptor
                .intercept_response(&request, response)
                .map_err(ExecutionError::Interceptor)?;
        }

        Ok(Exchange { request, response })
    }
}

/// Fluent HTTP client with a fixed base URL and default headers.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<ClientInner>,
}

impl RestClient {
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    /// A client with no base URL and no default headers.
    pub fn create() -> Self {
        Self::builder().build()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::builder().base_url(base_url).build()
    }

    /// A builder seeded with this client's configuration.
    ///
    /// Clients built from it are independent of this one. A custom transport
    /// is shared with the derived client; the built-in one is recreated, so a
    /// `timeout` set on the returned builder takes effect.
    pub fn mutate(&self) -> RestClientBuilder {
        RestClientBuilder {
            base_url: self.inner.base_url.clone(),
            default_headers: self.inner.default_headers.clone(),
            transport: self.inner.custom_transport.clone(),
            interceptors: self.inner.interceptors.clone(),
            status_handlers: self.inner.status_handlers.clone(),
            timeout: self.inner.timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn default_headers(&self) -> &HttpHeaders {
        &self.inner.default_headers
    }

    pub fn get(&self) -> RequestSpec {
        self.request(HttpMethod::Get)
    }

    pub fn post(&self) -> RequestBodySpec {
        RequestBodySpec::new(self.request(HttpMethod::Post))
    }

    pub fn put(&self) -> RequestBodySpec {
        RequestBodySpec::new(self.request(HttpMethod::Put))
    }

    pub fn patch(&self) -> RequestBodySpec {
        RequestBodySpec::new(self.request(HttpMethod::Patch))
    }

    pub fn delete(&self) -> RequestSpec {
        self.request(HttpMethod::Delete)
    }

    pub fn head(&self) -> RequestSpec {
        self.request(HttpMethod::Head)
    }

    pub fn options(&self) -> RequestSpec {
        self.request(HttpMethod::Options)
    }

    /// A builder for an arbitrary method. Bodies are allowed for every
    /// method here; whether the transport sends them is up to the transport.
    pub fn method(&self, method: HttpMethod) -> RequestBodySpec {
        RequestBodySpec::new(self.request(method))
    }

    fn request(&self, method: HttpMethod) -> RequestSpec {
        RequestSpec::new(Arc::clone(&self.inner), method)
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.inner.base_url)
            .field("default_headers", &self.inner.default_headers)
            .field("interceptors", &self.inner.interceptors.len())
            .field("status_handlers", &self.inner.status_handlers)
            .finish()
    }
}

/// Accumulates configuration for a [`RestClient`].
#[derive(Default)]
pub struct RestClientBuilder {
    base_url: String,
    default_headers: HttpHeaders,
    transport: Option<Arc<dyn Transport>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    status_handlers: StatusHandlers,
    timeout: Option<Duration>,
}

impl RestClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.add(name, value);
        self
    }

    pub fn default_header_values<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.default_headers.add(name, value);
        }
        self
    }

    /// Merge every pair of `headers` into the defaults.
    pub fn default_headers(mut self, headers: &HttpHeaders) -> Self {
        self.default_headers.extend_from(headers);
        self
    }

    /// Edit the default headers in place, e.g. to `set` or `remove` a name.
    pub fn default_headers_with(mut self, f: impl FnOnce(&mut HttpHeaders)) -> Self {
        f(&mut self.default_headers);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Total deadline for the built-in transport. Ignored when a custom
    /// transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// A status handler consulted for every request made by the client,
    /// after the request's own `on_status` handlers.
    pub fn default_status_handler<P, H>(mut self, predicate: P, handler: H) -> Self
    where
        P: Fn(StatusCode) -> bool + Send + Sync + 'static,
        H: Fn(&HttpRequest, &HttpResponse) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.status_handlers.push(predicate, handler);
        self
    }

    pub fn properties(mut self, properties: &ClientProperties) -> Self {
        if let Some(base_url) = &properties.base_url {
            self.base_url = base_url.clone();
        }
        for header in &properties.default_headers {
            self.default_headers.add(header.name.as_str(), header.value.as_str());
        }
        if let Some(timeout) = properties.timeout() {
            self.timeout = Some(timeout);
        }
        self
    }

    pub fn build(self) -> RestClient {
        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => default_transport(self.timeout),
        };

        RestClient {
            inner: Arc::new(ClientInner {
                base_url: self.base_url,
                default_headers: self.default_headers,
                transport,
                custom_transport: self.transport,
                interceptors: self.interceptors,
                status_handlers: self.status_handlers,
                timeout: self.timeout,
            }),
        }
    }
}

#[cfg(feature = "ureq")]
fn default_transport(timeout: Option<Duration>) -> Arc<dyn Transport> {
    match timeout {
        Some(timeout) => Arc::new(crate::transport::UreqTransport::with_timeout(timeout)),
        None => Arc::new(crate::transport::UreqTransport::new()),
    }
}

#[cfg(not(feature = "ureq"))]
fn default_transport(_timeout: Option<Duration>) -> Arc<dyn Transport> {
    use crate::transport::TransportErrorKind;

    Arc::new(|_: &HttpRequest| -> Result<HttpResponse, TransportError> {
        Err(TransportError::new(
            TransportErrorKind::Other,
            "no transport configured; enable the `ureq` feature or call `transport()`",
        ))
    })
}
