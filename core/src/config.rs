//! Declarative client configuration.
//!
//! `ClientProperties` carries the settings that usually live outside code
//! (base URL, default headers, timeout) and is applied to a builder with
//! [`RestClientBuilder::properties`](crate::RestClientBuilder::properties).

use std::time::Duration;

use serde::Deserialize;

use crate::error::RestClientError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HeaderProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientProperties {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Applied in order with `add` semantics.
    #[serde(default)]
    pub default_headers: Vec<HeaderProperty>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ClientProperties {
    pub fn from_json(raw: &str) -> Result<Self, RestClientError> {
        serde_json::from_str(raw).map_err(|e| RestClientError::Deserialization(e.to_string()))
    }

    /// Read `<PREFIX>_BASE_URL` and `<PREFIX>_TIMEOUT_MS`.
    ///
    /// Unset variables are left empty; an unparsable timeout is an error.
    pub fn from_env(prefix: &str) -> Result<Self, RestClientError> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RestClientError> {
        let base_url = lookup(&format!("{prefix}_BASE_URL"));
        let timeout_ms = lookup(&format!("{prefix}_TIMEOUT_MS"))
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    RestClientError::Deserialization(format!("{prefix}_TIMEOUT_MS: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            base_url,
            default_headers: Vec::new(),
            timeout_ms,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_properties() {
        let props = ClientProperties::from_json(
            r#"{
                "base_url": "https://jsonplaceholder.typicode.com",
                "default_headers": [
                    {"name": "Accept", "value": "application/json"},
                    {"name": "User-Agent", "value": "restclient-demo/1.0"}
                ],
                "timeout_ms": 2500
            }"#,
        )
        .unwrap();
        assert_eq!(props.base_url.as_deref(), Some("https://jsonplaceholder.typicode.com"));
        assert_eq!(props.default_headers.len(), 2);
        assert_eq!(props.default_headers[0].name, "Accept");
        assert_eq!(props.timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn missing_fields_default() {
        let props = ClientProperties::from_json("{}").unwrap();
        assert_eq!(props, ClientProperties::default());
    }

    #[test]
    fn reads_prefixed_variables() {
        let props = ClientProperties::from_lookup("USERS_API", |key| match key {
            "USERS_API_BASE_URL" => Some("http://localhost:3000".to_string()),
            "USERS_API_TIMEOUT_MS" => Some(" 750 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(props.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(props.timeout_ms, Some(750));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = ClientProperties::from_lookup("API", |key| {
            (key == "API_TIMEOUT_MS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("API_TIMEOUT_MS"));
    }
}
