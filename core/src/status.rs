//! Status dispatch: turns a completed response into success or an error.
//!
//! Registered `(predicate, handler)` pairs are tried in order and the first
//! matching predicate decides the outcome. When nothing matches, the default
//! policy raises `Client` for 4xx and `Server` for 5xx and lets everything
//! else through.

use std::sync::Arc;

use crate::error::{BoxError, RestClientError};
use crate::http::{HttpRequest, HttpResponse, StatusCode};

type Predicate = dyn Fn(StatusCode) -> bool + Send + Sync;
type Handler = dyn Fn(&HttpRequest, &HttpResponse) -> Result<(), BoxError> + Send + Sync;

#[derive(Clone)]
struct StatusHandler {
    predicate: Arc<Predicate>,
    handler: Arc<Handler>,
}

/// Ordered list of status predicates and their handlers.
#[derive(Clone, Default)]
pub struct StatusHandlers {
    handlers: Vec<StatusHandler>,
}

impl StatusHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<P, H>(&mut self, predicate: P, handler: H)
    where
        P: Fn(StatusCode) -> bool + Send + Sync + 'static,
        H: Fn(&HttpRequest, &HttpResponse) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.handlers.push(StatusHandler {
            predicate: Arc::new(predicate),
            handler: Arc::new(handler),
        });
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the first handler whose predicate matches. `None` if none did.
    pub fn handle(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
    ) -> Option<Result<(), BoxError>> {
        self.handlers
            .iter()
            .find(|h| (h.predicate)(response.status))
            .map(|h| (h.handler)(request, response))
    }
}

impl std::fmt::Debug for StatusHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusHandlers")
            .field("len", &self.handlers.len())
            .finish()
    }
}

/// Apply per-request handlers, then client defaults, then the default policy.
pub(crate) fn dispatch(
    request_handlers: &StatusHandlers,
    default_handlers: &StatusHandlers,
    request: &HttpRequest,
    response: &HttpResponse,
) -> Result<(), RestClientError> {
    let handled = request_handlers
        .handle(request, response)
        .or_else(|| default_handlers.handle(request, response));

    match handled {
        Some(outcome) => outcome.map_err(RestClientError::Handler),
        None => classify(request, response),
    }
}

/// The default policy: 4xx and 5xx become classified errors carrying the
/// response body as text.
pub fn classify(request: &HttpRequest, response: &HttpResponse) -> Result<(), RestClientError> {
    let status = response.status;
    if !status.is_error() {
        return Ok(());
    }

    let body = response.body_text();
    tracing::warn!(
        method = %request.method,
        url = %request.url,
        status = status.as_u16(),
        body = %body,
        "Request failed"
    );

    if status.is_4xx_client_error() {
        Err(RestClientError::Client {
            message: format!(
                "Client error: {} {} returned {}",
                request.method, request.url, status
            ),
            status,
            body,
        })
    } else {
        Err(RestClientError::Server {
            message: format!(
                "Server error: {} {} returned {}",
                request.method, request.url, status
            ),
            status,
            body,
        })
    }
}
