use crate::headers::HttpHeaders;
use crate::http::StatusCode;

/// Status, headers and (optionally) a decoded body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntity<T> {
    body: Option<T>,
    headers: HttpHeaders,
    status: StatusCode,
}

impl<T> ResponseEntity<T> {
    pub fn new(body: Option<T>, headers: HttpHeaders, status: StatusCode) -> Self {
        Self {
            body,
            headers,
            status,
        }
    }

    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_2xx_successful(&self) -> bool {
        self.status.is_2xx_successful()
    }

    /// Split into `(status, headers, body)`.
    pub fn into_parts(self) -> (StatusCode, HttpHeaders, Option<T>) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_half_open() {
        let ok = ResponseEntity::<()>::new(None, HttpHeaders::new(), StatusCode::NO_CONTENT);
        assert!(ok.is_2xx_successful());
        assert_eq!(ok.status_code(), 204);
        assert!(ok.body().is_none());

        let moved = StatusCode::from_u16(300).unwrap();
        let entity = ResponseEntity::new(Some("x"), HttpHeaders::new(), moved);
        assert!(!entity.is_2xx_successful());
        assert_eq!(entity.into_body(), Some("x"));
    }
}
