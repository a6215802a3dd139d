//! Typed client for a JSONPlaceholder-style `/users` resource.
//!
//! # Design
//! `UserClient` holds only a `RestClient` and carries no state between calls.
//! Each operation is one fluent chain; status handling is left to the default
//! policy unless the operation says otherwise.

use std::collections::BTreeMap;

use serde::Serialize;
use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::client::RestClient;
use crate::entity::ResponseEntity;
use crate::error::{RestClientError, Result};
use crate::headers::APPLICATION_JSON;
use crate::http::StatusCode;
use crate::request::RequestHeadersSpec;
use crate::types::User;

/// Errors raised by [`UserClient::get_user_with_custom_error_handling`] and
/// [`UserClient::get_user_with_error_handling`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserApiError {
    #[error("User not found: {0}")]
    NotFound(StatusCode),

    #[error("Service error: {0}")]
    Unavailable(StatusCode),

    #[error("User not found with id: {0}")]
    NotFoundWithId(i64),
}

#[derive(Debug, Clone)]
pub struct UserClient {
    rest: RestClient,
}

impl UserClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// A client for `base_url` that asks for JSON on every call.
    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(
            RestClient::builder()
                .base_url(base_url.trim_end_matches('/'))
                .default_header("Accept", APPLICATION_JSON)
                .build(),
        )
    }

    pub fn rest_client(&self) -> &RestClient {
        &self.rest
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.rest
            .get()
            .uri_named("/users/{id}", &[("id", &id)])
            .retrieve()
            .body()
    }

    pub fn get_all_users(&self) -> Result<Vec<User>> {
        let users = self.rest.get().uri("/users").retrieve().body()?;
        Ok(users.unwrap_or_default())
    }

    pub fn search_users(&self, name: &str, min_age: Option<u32>) -> Result<Vec<User>> {
        let mut request = self.rest.get().uri("/users/search").query_param("name", name);
        if let Some(min_age) = min_age {
            request = request.query_param("minAge", min_age);
        }
        Ok(request.retrieve().body()?.unwrap_or_default())
    }

    pub fn create_user(&self, user: &User) -> Result<Option<User>> {
        self.rest
            .post()
            .uri("/users")
            .content_type(APPLICATION_JSON)
            .body(user)
            .retrieve()
            .body()
    }

    /// Submit `name` and `email` as an urlencoded form.
    pub fn submit_form(&self, name: &str, email: &str) -> Result<Option<User>> {
        #[derive(Serialize)]
        struct Form<'a> {
            name: &'a str,
            email: &'a str,
        }

        self.rest
            .post()
            .uri("/form")
            .form(&Form { name, email })
            .retrieve()
            .body()
    }

    pub fn update_user(&self, id: i64, user: &User) -> Result<Option<User>> {
        self.rest
            .put()
            .uri_named("/users/{id}", &[("id", &id)])
            .content_type(APPLICATION_JSON)
            .body(user)
            .retrieve()
            .body()
    }

    pub fn partial_update_user(
        &self,
        id: i64,
        updates: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Option<User>> {
        self.rest
            .patch()
            .uri_named("/users/{id}", &[("id", &id)])
            .body(updates)
            .retrieve()
            .body()
    }

    pub fn delete_user(&self, id: i64) -> Result<()> {
        self.rest
            .delete()
            .uri_named("/users/{id}", &[("id", &id)])
            .retrieve()
            .to_bodiless_entity()?;
        Ok(())
    }

    pub fn delete_user_with_status(&self, id: i64) -> Result<StatusCode> {
        let entity = self
            .rest
            .delete()
            .uri_named("/users/{id}", &[("id", &id)])
            .retrieve()
            .to_bodiless_entity()?;
        Ok(entity.status())
    }

    /// Tag the request with a fresh `X-Request-ID` and an API version.
    pub fn get_user_with_headers(&self, id: i64) -> Result<Option<User>> {
        self.rest
            .get()
            .uri_named("/users/{id}", &[("id", &id)])
            .header("X-Request-ID", Uuid::new_v4().to_string())
            .header("X-API-Version", "v2")
            .retrieve()
            .body()
    }

    /// Headers computed per call: a fresh request id, the current time and
    /// an explicit JSON `Accept`.
    pub fn get_user_with_dynamic_headers(&self, id: i64) -> Result<Option<User>> {
        self.rest
            .get()
            .uri_named("/users/{id}", &[("id", &id)])
            .headers_with(|h| {
                h.set("X-Request-ID", Uuid::new_v4().to_string());
                h.set("X-Timestamp", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
                h.set("Accept", APPLICATION_JSON);
            })
            .retrieve()
            .body()
    }

    pub fn authenticated_user(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.rest
            .get()
            .uri("/secure/user")
            .headers_with(|h| h.set_basic_auth(username, password))
            .retrieve()
            .body()
    }

    pub fn get_user_with_metadata(&self, id: i64) -> Result<ResponseEntity<User>> {
        self.rest
            .get()
            .uri_named("/users/{id}", &[("id", &id)])
            .retrieve()
            .to_entity()
    }

    /// `Ok(None)` when the user does not exist.
    pub fn get_user_safely(&self, id: i64) -> Result<Option<User>> {
        match self.get_user(id) {
            Err(RestClientError::Client { status, .. }) if status == StatusCode::NOT_FOUND => {
                Ok(None)
            }
            other => other,
        }
    }

    /// Any 4xx/5xx is logged and reported as [`UserApiError::NotFoundWithId`].
    pub fn get_user_with_error_handling(&self, id: i64) -> Result<Option<User>> {
        self.get_user(id).map_err(|err| match err {
            RestClientError::Client { status, body, .. }
            | RestClientError::Server { status, body, .. } => {
                tracing::warn!(%status, %body, id, "user lookup failed");
                RestClientError::Handler(Box::new(UserApiError::NotFoundWithId(id)))
            }
            other => other,
        })
    }

    /// 4xx becomes [`UserApiError::NotFound`], 5xx [`UserApiError::Unavailable`].
    pub fn get_user_with_custom_error_handling(&self, id: i64) -> Result<Option<User>> {
        self.rest
            .get()
            .uri_named("/users/{id}", &[("id", &id)])
            .retrieve()
            .on_status(StatusCode::is_4xx_client_error, |_, response| {
                Err(UserApiError::NotFound(response.status).into())
            })
            .on_status(StatusCode::is_5xx_server_error, |_, response| {
                Err(UserApiError::Unavailable(response.status).into())
            })
            .body()
    }
}
