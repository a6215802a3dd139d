//! Error types for the REST client.
//!
//! # Design
//! Status classification produces `Client` (4xx) or `Server` (5xx), each with
//! the status and the fully-read response body. Errors raised by
//! caller-supplied handlers are carried unchanged in `Handler` so callers can
//! downcast them back to their own types.

use thiserror::Error;

use crate::http::StatusCode;
use crate::transport::TransportError;

/// Boxed error returned by status handlers and exchange callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, RestClientError>;

#[derive(Debug, Error)]
pub enum RestClientError {
    /// The server answered with a 4xx status.
    #[error("{message}")]
    Client {
        message: String,
        status: StatusCode,
        body: String,
    },

    /// The server answered with a 5xx status.
    #[error("{message}")]
    Server {
        message: String,
        status: StatusCode,
        body: String,
    },

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request body could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Raised by an `on_status` handler or an `exchange` callback.
    #[error(transparent)]
    Handler(BoxError),

    #[error("interceptor rejected exchange: {0}")]
    Interceptor(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RestClientError {
    /// Status code of a classified error.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            RestClientError::Client { status, .. } | RestClientError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Response body text of a classified error.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            RestClientError::Client { body, .. } | RestClientError::Server { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RestClientError::Client { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, RestClientError::Server { .. })
    }

    /// The handler error as `E`, if this is a `Handler` error of that type.
    pub fn handler_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            RestClientError::Handler(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}
