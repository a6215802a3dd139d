//! The network boundary.
//!
//! The facade never performs I/O itself: it hands a finished `HttpRequest` to
//! a `Transport` and gets a fully-read `HttpResponse` back. Any
//! `Fn(&HttpRequest) -> Result<HttpResponse, TransportError>` is a transport,
//! which keeps tests free of sockets. `UreqTransport` (feature `ureq`) is the
//! blocking network implementation.

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Io,
    /// The peer answered with something that is not a usable HTTP response.
    InvalidResponse,
    Other,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport error ({kind:?}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

/// Executes one HTTP exchange.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::time::Duration;

    use super::{Transport, TransportError, TransportErrorKind};
    use crate::headers::HttpHeaders;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, StatusCode};

    /// Blocking transport backed by a `ureq` agent.
    ///
    /// 4xx/5xx responses come back as data, never as `Err`, so status
    /// classification stays with the facade.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::build(None)
        }

        /// Abort any exchange that takes longer than `timeout` in total.
        pub fn with_timeout(timeout: Duration) -> Self {
            Self::build(Some(timeout))
        }

        fn build(timeout: Option<Duration>) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = request.url.as_str();
            let body = request.body.as_deref();

            let result = match request.method {
                HttpMethod::Get => call(with_headers(self.agent.get(url), &request.headers), body),
                HttpMethod::Delete => {
                    call(with_headers(self.agent.delete(url), &request.headers), body)
                }
                HttpMethod::Head => call(with_headers(self.agent.head(url), &request.headers), body),
                HttpMethod::Options => {
                    call(with_headers(self.agent.options(url), &request.headers), body)
                }
                HttpMethod::Post => send(with_headers(self.agent.post(url), &request.headers), body),
                HttpMethod::Put => send(with_headers(self.agent.put(url), &request.headers), body),
                HttpMethod::Patch => {
                    send(with_headers(self.agent.patch(url), &request.headers), body)
                }
            };

            let mut response = result.map_err(map_error)?;

            let status = StatusCode::from_u16(response.status().as_u16()).ok_or_else(|| {
                TransportError::new(
                    TransportErrorKind::InvalidResponse,
                    format!("invalid status code {}", response.status()),
                )
            })?;

            let mut headers = HttpHeaders::new();
            for (name, value) in response.headers() {
                headers.add(canonical_name(name.as_str()), header_text(value));
            }

            let body = response.body_mut().read_to_vec().map_err(map_error)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    /// `content-type` -> `Content-Type`, so lookups by the usual spelling hit.
    fn canonical_name(name: &str) -> String {
        name.split('-')
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Header values are bytes on the wire; anything that is not UTF-8 is
    /// kept lossily rather than dropped.
    fn header_text(value: &ureq::http::HeaderValue) -> String {
        String::from_utf8_lossy(value.as_bytes()).into_owned()
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &HttpHeaders,
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        builder
    }

    /// Bodiless verbs still carry a body when the caller set one.
    fn call(
        builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
        body: Option<&[u8]>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(bytes) => builder.force_send_body().send(bytes),
            None => builder.call(),
        }
    }

    fn send(
        builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
        body: Option<&[u8]>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(bytes) => builder.send(bytes),
            None => builder.send_empty(),
        }
    }

    fn map_error(err: ureq::Error) -> TransportError {
        let kind = match &err {
            ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => TransportErrorKind::Connect,
            ureq::Error::Io(_) => TransportErrorKind::Io,
            _ => TransportErrorKind::Other,
        };
        TransportError::new(kind, err.to_string())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HttpHeaders;
    use crate::http::{HttpMethod, StatusCode};

    #[test]
    fn closures_are_transports() {
        let transport = |request: &HttpRequest| {
            Ok::<_, TransportError>(HttpResponse::text(StatusCode::OK, request.url.clone()))
        };
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/ping".to_string(),
            headers: HttpHeaders::new(),
            body: None,
        };
        let response = transport.execute(&request).unwrap();
        assert_eq!(response.body_text(), "http://localhost/ping");
    }

    #[test]
    fn timeout_kind() {
        let err = TransportError::new(TransportErrorKind::Timeout, "deadline elapsed");
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "transport error (Timeout): deadline elapsed");
    }
}
