//! Request body encoding and response body decoding.
//!
//! # Design
//! Bodies are captured as a `Payload` when the builder is configured and only
//! turned into bytes when the request is dispatched. Decoding picks the format
//! from the response `Content-Type`. Unknown fields are ignored by serde's
//! defaults; the document itself is never rewritten, so `null` members reach
//! targets that can hold them. Non-nullable DTO fields opt into treating
//! `null` as their default with [`null_as_default`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::RestClientError;
use crate::headers::{APPLICATION_FORM_URLENCODED, APPLICATION_JSON, TEXT_PLAIN};

/// A request body waiting to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    /// Ordered `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    Text(String),
    Bytes { content_type: String, data: Vec<u8> },
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, RestClientError> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(|e| RestClientError::Serialization(e.to_string()))
    }

    pub fn form<T: Serialize + ?Sized>(value: &T) -> Result<Self, RestClientError> {
        let encoded = serde_urlencoded::to_string(value)
            .map_err(|e| RestClientError::Serialization(e.to_string()))?;
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(&encoded)
            .map_err(|e| RestClientError::Serialization(e.to_string()))?;
        Ok(Payload::Form(pairs))
    }

    pub fn content_type(&self) -> &str {
        match self {
            Payload::Json(_) => APPLICATION_JSON,
            Payload::Form(_) => APPLICATION_FORM_URLENCODED,
            Payload::Text(_) => TEXT_PLAIN,
            Payload::Bytes { content_type, .. } => content_type.as_str(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, RestClientError> {
        match self {
            Payload::Json(value) => {
                serde_json::to_vec(value).map_err(|e| RestClientError::Serialization(e.to_string()))
            }
            Payload::Form(pairs) => serde_urlencoded::to_string(pairs)
                .map(String::into_bytes)
                .map_err(|e| RestClientError::Serialization(e.to_string())),
            Payload::Text(text) => Ok(text.clone().into_bytes()),
            Payload::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}

/// Decode a response body into `T`.
///
/// Returns `Ok(None)` for an empty body and for a JSON `null` document. The
/// document is handed to serde untouched; types that want `null` members to
/// fall back to a default say so per field with [`null_as_default`].
pub fn decode<T: DeserializeOwned>(
    body: &[u8],
    content_type: Option<&str>,
) -> Result<Option<T>, RestClientError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    if is_form(content_type) {
        return serde_urlencoded::from_bytes(body)
            .map(Some)
            .map_err(|e| RestClientError::Deserialization(e.to_string()));
    }

    serde_json::from_slice::<Option<T>>(body)
        .map_err(|e| RestClientError::Deserialization(e.to_string()))
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim_start().starts_with(APPLICATION_FORM_URLENCODED))
        .unwrap_or(false)
}

/// Field deserializer that reads `null` as `T::default()`.
///
/// Use together with `#[serde(default)]` so a missing member defaults too:
///
/// ```
/// #[derive(serde::Deserialize)]
/// struct Account {
///     #[serde(default, deserialize_with = "restclient_core::codec::null_as_default")]
///     id: i64,
/// }
///
/// let account: Account = serde_json::from_str(r#"{"id":null}"#).unwrap();
/// assert_eq!(account.id, 0);
/// ```
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
