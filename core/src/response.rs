//! Terminal projections of a retrieved request.
//!
//! # Design
//! A `ResponseSpec` executes its request lazily, on the first projection, and
//! caches the outcome. Every later projection on the same instance reuses that
//! outcome, so one instance never causes more than one transport call. Status
//! dispatch runs on every projection, against the cached response.

use std::cell::OnceCell;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::client::{ClientInner, Exchange, ExecutionError};
use crate::codec;
use crate::entity::ResponseEntity;
use crate::error::{BoxError, Result};
use crate::http::{HttpRequest, HttpResponse, StatusCode};
use crate::status::{self, StatusHandlers};

/// A dispatched-on-demand request with its status handlers.
pub struct ResponseSpec {
    client: Arc<ClientInner>,
    request: std::result::Result<HttpRequest, ExecutionError>,
    handlers: StatusHandlers,
    outcome: OnceCell<std::result::Result<Exchange, ExecutionError>>,
}

impl ResponseSpec {
    pub(crate) fn new(
        client: Arc<ClientInner>,
        request: std::result::Result<HttpRequest, ExecutionError>,
    ) -> Self {
        Self {
            client,
            request,
            handlers: StatusHandlers::new(),
            outcome: OnceCell::new(),
        }
    }

    /// Register a handler for responses whose status matches `predicate`.
    ///
    /// Handlers are tried in registration order, before the client's default
    /// handlers. The first match decides: an `Err` fails the projection, an
    /// `Ok(())` lets the response through untouched.
    pub fn on_status<P, H>(mut self, predicate: P, handler: H) -> Self
    where
        P: Fn(StatusCode) -> bool + Send + Sync + 'static,
        H: Fn(&HttpRequest, &HttpResponse) -> std::result::Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.push(predicate, handler);
        self
    }

    /// Decode the body into `T`. `None` when the body is empty.
    ///
    /// The body is read as JSON, or as a form when the response says so; a
    /// `text/plain` body is not a JSON string, so use [`body_text`] for it.
    ///
    /// [`body_text`]: ResponseSpec::body_text
    pub fn body<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let response = self.checked_response()?;
        codec::decode(&response.body, response.headers.content_type())
    }

    /// The body as UTF-8 text. `None` when the body is empty.
    pub fn body_text(&self) -> Result<Option<String>> {
        let response = self.checked_response()?;
        Ok((!response.body.is_empty()).then(|| response.body_text()))
    }

    pub fn body_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.checked_response()?.body.clone())
    }

    /// Status, headers and the body decoded into `T`.
    pub fn to_entity<T: DeserializeOwned>(&self) -> Result<ResponseEntity<T>> {
        let response = self.checked_response()?;
        let body = codec::decode(&response.body, response.headers.content_type())?;
        Ok(ResponseEntity::new(
            body,
            response.headers.clone(),
            response.status,
        ))
    }

    pub fn to_text_entity(&self) -> Result<ResponseEntity<String>> {
        let response = self.checked_response()?;
        let body = (!response.body.is_empty()).then(|| response.body_text());
        Ok(ResponseEntity::new(
            body,
            response.headers.clone(),
            response.status,
        ))
    }

    /// Status and headers only; any body is discarded.
    pub fn to_bodiless_entity(&self) -> Result<ResponseEntity<()>> {
        let response = self.checked_response()?;
        Ok(ResponseEntity::new(
            None,
            response.headers.clone(),
            response.status,
        ))
    }

    fn exchange(&self) -> Result<&Exchange> {
        let outcome = self.outcome.get_or_init(|| match &self.request {
            Ok(request) => self.client.execute(request.clone()),
            Err(err) => Err(err.clone()),
        });
        outcome.as_ref().map_err(|err| err.clone().into())
    }

    fn checked_response(&self) -> Result<&HttpResponse> {
        let exchange = self.exchange()?;
        status::dispatch(
            &self.handlers,
            &self.client.status_handlers,
            &exchange.request,
            &exchange.response,
        )?;
        Ok(&exchange.response)
    }
}
