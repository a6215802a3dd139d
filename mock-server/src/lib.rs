//! In-process stand-in for the two public APIs the client talks to: a
//! JSONPlaceholder-style `/users` resource and an httpbin-style echo service.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Form, Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Credentials accepted by `/secure/user`.
pub const SECURE_USERNAME: &str = "alice";
pub const SECURE_PASSWORD: &str = "secret";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    #[serde(rename = "minAge")]
    pub min_age: Option<u32>,
}

#[derive(Deserialize)]
pub struct UserForm {
    pub name: String,
    pub email: String,
}

#[derive(Debug)]
pub struct Store {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

impl Store {
    /// Two seeded users, ids 1 and 2.
    pub fn seeded() -> Self {
        let users = [
            User {
                id: 1,
                name: "Leanne Graham".to_string(),
                username: Some("Bret".to_string()),
                email: "Sincere@april.biz".to_string(),
                phone: Some("1-770-736-8031 x56442".to_string()),
                website: Some("hildegard.org".to_string()),
                age: Some(31),
            },
            User {
                id: 2,
                name: "Ervin Howell".to_string(),
                username: Some("Antonette".to_string()),
                email: "Shanna@melissa.tv".to_string(),
                phone: None,
                website: Some("anastasia.net".to_string()),
                age: Some(17),
            },
        ];
        Self {
            next_id: users.len() as i64 + 1,
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }

    fn insert(&mut self, mut user: User) -> User {
        user.id = self.next_id;
        self.next_id += 1;
        self.users.insert(user.id, user.clone());
        user
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/search", get(search_users))
        .route(
            "/users/{id}",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        .route("/form", post(submit_form))
        .route("/secure/user", get(secure_user))
        .route("/get", get(echo))
        .route("/post", post(echo))
        .route("/put", put(echo))
        .route("/patch", patch(echo))
        .route("/delete", delete(echo))
        .route("/headers", get(echo_headers))
        .route("/ip", get(ip))
        .route("/user-agent", get(user_agent))
        .route("/status/{code}", get(status).post(status).delete(status))
        .route("/basic-auth/{user}/{passwd}", get(basic_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(store.users.values().cloned().collect())
}

async fn search_users(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<User>> {
    let store = db.read().await;
    let needle = params.name.map(|n| n.to_lowercase());
    let found = store
        .users
        .values()
        .filter(|u| {
            needle
                .as_deref()
                .map_or(true, |n| u.name.to_lowercase().contains(n))
        })
        .filter(|u| params.min_age.map_or(true, |min| u.age.unwrap_or(0) >= min))
        .cloned()
        .collect();
    Json(found)
}

async fn create_user(State(db): State<Db>, Json(input): Json<User>) -> (StatusCode, Json<User>) {
    let user = db.write().await.insert(input);
    tracing::debug!(id = user.id, "created user");
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<User>, StatusCode> {
    let store = db.read().await;
    store.users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(mut input): Json<User>,
) -> Result<Json<User>, StatusCode> {
    let mut store = db.write().await;
    let user = store.users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    input.id = id;
    *user = input;
    Ok(Json(user.clone()))
}

async fn patch_user(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(updates): Json<Map<String, Value>>,
) -> Result<Json<User>, StatusCode> {
    let mut store = db.write().await;
    let user = store.users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let mut merged = match serde_json::to_value(&*user) {
        Ok(Value::Object(map)) => map,
        _ => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };
    merged.extend(updates);
    merged.insert("id".to_string(), Value::from(id));
    let patched: User =
        serde_json::from_value(Value::Object(merged)).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    *user = patched;
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<i64>) -> StatusCode {
    let mut store = db.write().await;
    match store.users.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn submit_form(State(db): State<Db>, Form(form): Form<UserForm>) -> (StatusCode, Json<User>) {
    let user = db.write().await.insert(User {
        name: form.name,
        email: form.email,
        ..User::default()
    });
    (StatusCode::CREATED, Json(user))
}

async fn secure_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, StatusCode> {
    let expected = format!("{SECURE_USERNAME}:{SECURE_PASSWORD}");
    if basic_credentials(&headers).as_deref() != Some(expected.as_str()) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let store = db.read().await;
    store.users.get(&1).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            (status, format!("{code} {reason}")).into_response()
        }
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}

async fn basic_auth(
    Path((user, passwd)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let expected = format!("{user}:{passwd}");
    if basic_credentials(&headers).as_deref() == Some(expected.as_str()) {
        Ok(Json(serde_json::json!({ "authenticated": true, "user": user })))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Echo the request back in httpbin's shape.
async fn echo(
    uri: Uri,
    headers: HeaderMap,
    Query(args): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Value> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let data = String::from_utf8_lossy(&body).into_owned();
    let json = if content_type.starts_with("application/json") {
        serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    let form: BTreeMap<String, String> = if content_type.starts_with("application/x-www-form-urlencoded") {
        form_pairs(&data)
    } else {
        BTreeMap::new()
    };

    Json(serde_json::json!({
        "url": format!("http://{host}{uri}"),
        "args": args,
        "headers": header_map(&headers),
        "data": data,
        "json": json,
        "form": form,
        "origin": "127.0.0.1",
        "user-agent": headers.get(header::USER_AGENT).and_then(|h| h.to_str().ok()),
    }))
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    Json(serde_json::json!({ "headers": header_map(&headers) }))
}

async fn ip() -> Json<Value> {
    Json(serde_json::json!({ "origin": "127.0.0.1" }))
}

async fn user_agent(headers: HeaderMap) -> Json<Value> {
    let agent = headers.get(header::USER_AGENT).and_then(|h| h.to_str().ok());
    Json(serde_json::json!({ "user-agent": agent }))
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((title_case(name.as_str()), value.to_str().ok()?.to_string())))
        .collect()
}

fn basic_credentials(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    String::from_utf8(decoded).ok()
}

fn form_pairs(raw: &str) -> BTreeMap<String, String> {
    serde_urlencoded::from_str(raw).unwrap_or_default()
}

/// `x-request-id` -> `X-Request-Id`, the way httpbin reports header names.
fn title_case(name: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_without_absent_optionals() {
        let user = User {
            id: 7,
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            ..User::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn user_fields_default_when_missing() {
        let user: User = serde_json::from_str(r#"{"name":"Only name"}"#).unwrap();
        assert_eq!(user.id, 0);
        assert_eq!(user.email, "");
    }

    #[test]
    fn seeded_store_assigns_next_id() {
        let mut store = Store::seeded();
        let user = store.insert(User::default());
        assert_eq!(user.id, 3);
    }

    #[test]
    fn title_cases_header_names() {
        assert_eq!(title_case("x-request-id"), "X-Request-Id");
        assert_eq!(title_case("accept"), "Accept");
    }

    #[test]
    fn decodes_form_pairs() {
        let form = form_pairs("username=johndoe&email=john%40example.com");
        assert_eq!(form["username"], "johndoe");
        assert_eq!(form["email"], "john@example.com");
    }
}
