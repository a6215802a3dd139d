//! Domain DTOs for the user and echo APIs.
//!
//! # Design
//! These types mirror the mock server's schema but are defined independently;
//! the integration tests catch drift. Every field tolerates being absent or
//! `null`: optional fields through `Option`, the rest through
//! `null_as_default` plus the container-level `#[serde(default)]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::null_as_default;
use crate::template::{QueryArgument, QueryParams};

/// A user record as served by a JSONPlaceholder-style API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: Some(age),
            ..Self::default()
        }
    }
}

/// The echo document returned by httpbin-style endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpBinResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub args: BTreeMap<String, serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub data: String,
    pub json: Option<serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub form: BTreeMap<String, serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub origin: String,
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Search criteria that expand into query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub search_term: String,
    pub limit: u32,
    pub sort_by: Option<String>,
    pub ascending: bool,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            limit: Self::DEFAULT_LIMIT,
            sort_by: None,
            ascending: true,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }
}

impl QueryArgument for SearchQuery {
    fn resolve(&self, params: &mut QueryParams) {
        if !self.search_term.trim().is_empty() {
            params.add("q", self.search_term.as_str());
        }
        params.add("limit", self.limit.to_string());
        if let Some(sort) = self.sort_by.as_deref().filter(|s| !s.trim().is_empty()) {
            params.add("sort", sort);
        }
        params.add("order", if self.ascending { "asc" } else { "desc" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_tolerates_nulls_and_unknown_fields() {
        let user: User = crate::codec::decode(
            br#"{"id":null,"name":"Leanne","email":"l@example.com","address":{"city":"Gwenborough"}}"#,
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(user.id, 0);
        assert_eq!(user.name, "Leanne");
        assert_eq!(user.age, None);
    }

    #[test]
    fn user_omits_absent_optionals() {
        let json = serde_json::to_value(User::new("Alice", "alice@example.com", 28)).unwrap();
        assert_eq!(json["age"], 28);
        assert!(json.get("phone").is_none());
        assert!(json.get("username").is_none());
    }

    #[test]
    fn httpbin_user_agent_is_renamed() {
        let echo: HttpBinResponse =
            serde_json::from_str(r#"{"url":"http://x/get","user-agent":"demo/1.0"}"#).unwrap();
        assert_eq!(echo.user_agent.as_deref(), Some("demo/1.0"));
        assert!(echo.args.is_empty());
    }

    #[test]
    fn httpbin_nulls_fall_back_to_defaults() {
        let echo: HttpBinResponse = crate::codec::decode(
            br#"{"url":null,"args":null,"origin":null,"json":{"a":null}}"#,
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(echo.url, "");
        assert!(echo.args.is_empty());
        assert_eq!(echo.json, Some(serde_json::json!({"a": null})));
    }

    #[test]
    fn search_query_defaults() {
        let mut params = QueryParams::new();
        SearchQuery::new("rust").resolve(&mut params);
        assert_eq!(params.encode(), "q=rust&limit=10&order=asc");
    }

    #[test]
    fn search_query_skips_blank_fields() {
        let mut params = QueryParams::new();
        SearchQuery::new("  ")
            .limit(5)
            .sort_by(" ")
            .descending()
            .resolve(&mut params);
        assert_eq!(params.encode(), "limit=5&order=desc");
    }

    #[test]
    fn search_query_with_sort() {
        let mut params = QueryParams::new();
        SearchQuery::new("spring boot").sort_by("date").resolve(&mut params);
        assert_eq!(params.encode(), "q=spring+boot&limit=10&sort=date&order=asc");
    }
}
