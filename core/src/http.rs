//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The facade
//! assembles an `HttpRequest`, hands it to a [`Transport`](crate::Transport)
//! and receives a fully-read `HttpResponse` back. Nothing in here touches the
//! network, so every layer above it can be exercised with canned responses.
//!
//! All fields use owned types (`String`, `Vec`) so values can be logged,
//! cached and moved across threads without lifetime concerns.

use std::fmt;

use crate::headers::HttpHeaders;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A three-digit HTTP status code.
///
/// Only values in `100..=999` can be represented, so every `StatusCode` held
/// by a response is well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    /// Returns `None` unless `code` has exactly three digits.
    pub fn from_u16(code: u16) -> Option<Self> {
        (100..=999).contains(&code).then_some(StatusCode(code))
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    pub fn is_1xx_informational(self) -> bool {
        (100..200).contains(&self.0)
    }

    pub fn is_2xx_successful(self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn is_3xx_redirection(self) -> bool {
        (300..400).contains(&self.0)
    }

    pub fn is_4xx_client_error(self) -> bool {
        (400..500).contains(&self.0)
    }

    pub fn is_5xx_server_error(self) -> bool {
        (500..600).contains(&self.0)
    }

    /// True for 4xx and 5xx responses.
    pub fn is_error(self) -> bool {
        self.is_4xx_client_error() || self.is_5xx_server_error()
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = u16;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        StatusCode::from_u16(code).ok_or(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: base URL, expanded URI and query string already joined.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Option<Vec<u8>>,
}

/// An HTTP response described as plain data, body fully read.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    /// A response carrying a JSON document.
    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HttpHeaders::new();
        headers.set_content_type(crate::headers::APPLICATION_JSON);
        Self {
            status,
            headers,
            body: body.into().into_bytes(),
        }
    }

    /// A response carrying plain text.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HttpHeaders::new();
        headers.set_content_type(crate::headers::TEXT_PLAIN);
        Self {
            status,
            headers,
            body: body.into().into_bytes(),
        }
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
