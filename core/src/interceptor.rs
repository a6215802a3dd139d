//! Request and response interceptors.
//!
//! Interceptors are registered on the client builder and run, in
//! registration order, around every exchange the client performs. They can
//! rewrite the outgoing request, observe or rewrite the response, or abort
//! the exchange with an error.

use crate::http::{HttpRequest, HttpResponse};

/// Hook invoked around each exchange.
pub trait Interceptor: Send + Sync {
    /// Inspect or modify the request before it reaches the transport.
    fn intercept_request(&self, request: HttpRequest) -> Result<HttpRequest, String> {
        Ok(request)
    }

    /// Inspect or modify the response before status dispatch.
    fn intercept_response(
        &self,
        _request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<HttpResponse, String> {
        Ok(response)
    }
}

/// Logs every request and response through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingInterceptor {
    log_headers: bool,
    log_body: bool,
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log header names and values.
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }

    /// Also log non-empty bodies as (lossy) UTF-8.
    pub fn with_body(mut self) -> Self {
        self.log_body = true;
        self
    }
}

impl Interceptor for LoggingInterceptor {
    fn intercept_request(&self, request: HttpRequest) -> Result<HttpRequest, String> {
        tracing::info!(method = %request.method, url = %request.url, "Making request");

        if self.log_headers {
            for (name, value) in request.headers.iter() {
                tracing::info!(header = %name, value = %value, "Request header");
            }
        }
        if self.log_body {
            if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
                tracing::info!(body = %String::from_utf8_lossy(body), "Request body");
            }
        }

        Ok(request)
    }

    fn intercept_response(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<HttpResponse, String> {
        tracing::info!(
            method = %request.method,
            url = %request.url,
            status = %response.status,
            "Response received"
        );

        if self.log_headers {
            for (name, value) in response.headers.iter() {
                tracing::info!(header = %name, value = %value, "Response header");
            }
        }
        if self.log_body && !response.body.is_empty() {
            tracing::info!(body = %response.body_text(), "Response body");
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HttpHeaders;
    use crate::http::{HttpMethod, StatusCode};

    #[test]
    fn logging_interceptor_passes_exchange_through() {
        let interceptor = LoggingInterceptor::new().with_headers().with_body();
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost/post".to_string(),
            headers: [("Accept", "application/json")].into_iter().collect::<HttpHeaders>(),
            body: Some(b"{}".to_vec()),
        };
        let out = interceptor.intercept_request(request.clone()).unwrap();
        assert_eq!(out, request);

        let response = HttpResponse::json(StatusCode::OK, "{}");
        let out = interceptor.intercept_response(&request, response.clone()).unwrap();
        assert_eq!(out, response);
    }
}
