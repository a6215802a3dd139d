//! Typed client for an httpbin-style echo service.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::client::RestClient;
use crate::entity::ResponseEntity;
use crate::error::Result;
use crate::request::RequestHeadersSpec;
use crate::types::{HttpBinResponse, SearchQuery, User};

#[derive(Debug, Clone)]
pub struct HttpBinClient {
    rest: RestClient,
}

impl HttpBinClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub fn get(&self) -> Result<HttpBinResponse> {
        echo(self.rest.get().uri("/get").retrieve().body()?)
    }

    /// The `/get` echo with status and headers kept alongside.
    pub fn get_with_response_entity(&self) -> Result<ResponseEntity<HttpBinResponse>> {
        self.rest.get().uri("/get").retrieve().to_entity()
    }

    /// The `/get` echo as an untyped document.
    pub fn get_as_map(&self) -> Result<BTreeMap<String, Value>> {
        Ok(self.rest.get().uri("/get").retrieve().body()?.unwrap_or_default())
    }

    pub fn get_with_params(&self, params: &BTreeMap<String, String>) -> Result<HttpBinResponse> {
        let mut request = self.rest.get().uri("/get");
        for (name, value) in params {
            request = request.query_param(name.as_str(), value);
        }
        echo(request.retrieve().body()?)
    }

    pub fn post_user(&self, user: &User) -> Result<HttpBinResponse> {
        echo(self.rest.post().uri("/post").body(user).retrieve().body()?)
    }

    pub fn post_form<T: Serialize + ?Sized>(&self, form: &T) -> Result<HttpBinResponse> {
        echo(self.rest.post().uri("/post").form(form).retrieve().body()?)
    }

    pub fn put_user(&self, user: &User) -> Result<HttpBinResponse> {
        echo(self.rest.put().uri("/put").body(user).retrieve().body()?)
    }

    pub fn patch_fields(
        &self,
        fields: &BTreeMap<String, serde_json::Value>,
    ) -> Result<HttpBinResponse> {
        echo(self.rest.patch().uri("/patch").body(fields).retrieve().body()?)
    }

    /// Call `/basic-auth/{user}/{passwd}` with matching credentials.
    pub fn basic_auth(&self, user: &str, passwd: &str) -> Result<HttpBinResponse> {
        let response = self
            .rest
            .get()
            .uri_vars("/basic-auth/{0}/{1}", &[&user, &passwd])
            .headers_with(|h| h.set_basic_auth(user, passwd))
            .retrieve()
            .body()?;
        echo(response)
    }

    pub fn delete_resource(&self) -> Result<HttpBinResponse> {
        echo(self.rest.delete().uri("/delete").retrieve().body()?)
    }

    /// The request headers as the server saw them, after sending two test
    /// headers of our own.
    pub fn headers(&self) -> Result<BTreeMap<String, String>> {
        let response = self
            .rest
            .get()
            .uri("/headers")
            .header("X-Test-Header-1", "Value1")
            .header("X-Test-Header-2", "Value2")
            .retrieve()
            .body()?;
        Ok(echo(response)?.headers)
    }

    pub fn ip_address(&self) -> Result<Option<String>> {
        self.string_member("/ip", "origin")
    }

    pub fn user_agent(&self) -> Result<Option<String>> {
        self.string_member("/user-agent", "user-agent")
    }

    fn string_member(&self, uri: &str, name: &str) -> Result<Option<String>> {
        let document: Option<BTreeMap<String, Value>> = self.rest.get().uri(uri).retrieve().body()?;
        Ok(document
            .and_then(|mut members| members.remove(name))
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    pub fn search(&self, query: &SearchQuery) -> Result<HttpBinResponse> {
        echo(self.rest.get().uri("/get").query_args(query).retrieve().body()?)
    }

    /// Request `/status/{code}`; only status and headers are kept.
    pub fn status(&self, code: u16) -> Result<ResponseEntity<()>> {
        self.rest
            .get()
            .uri_vars("/status/{0}", &[&code])
            .retrieve()
            .to_bodiless_entity()
    }
}

/// An echo endpoint always answers with a document; an empty body decodes to
/// the empty echo.
fn echo(body: Option<HttpBinResponse>) -> Result<HttpBinResponse> {
    Ok(body.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::http::{HttpRequest, HttpResponse, StatusCode};
    use crate::transport::TransportError;

    fn client(reply: HttpResponse) -> (HttpBinClient, Arc<Mutex<Vec<String>>>) {
        let urls = Arc::new(Mutex::new(Vec::new()));
        let log = urls.clone();
        let rest = RestClient::builder()
            .base_url("https://httpbin.test")
            .transport(move |request: &HttpRequest| {
                log.lock().unwrap().push(request.url.clone());
                Ok::<_, TransportError>(reply.clone())
            })
            .build();
        (HttpBinClient::new(rest), urls)
    }

    #[test]
    fn search_contributes_query_parameters() {
        let (bin, urls) = client(HttpResponse::json(StatusCode::OK, r#"{"args":{"q":"rust"}}"#));
        let echo = bin.search(&SearchQuery::new("rust").limit(3).descending()).unwrap();
        assert_eq!(echo.args["q"], "rust");
        assert_eq!(
            urls.lock().unwrap()[0],
            "https://httpbin.test/get?q=rust&limit=3&order=desc"
        );
    }

    #[test]
    fn basic_auth_expands_path() {
        let (bin, urls) = client(HttpResponse::json(StatusCode::OK, "{}"));
        bin.basic_auth("user", "passwd").unwrap();
        assert_eq!(urls.lock().unwrap()[0], "https://httpbin.test/basic-auth/user/passwd");
    }

    #[test]
    fn status_classifies_errors() {
        let (bin, _) = client(HttpResponse::text(StatusCode::SERVICE_UNAVAILABLE, "busy"));
        let err = bin.status(503).unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.response_body(), Some("busy"));
    }

    #[test]
    fn headers_sends_test_headers() {
        let reply = HttpResponse::json(
            StatusCode::OK,
            r#"{"headers":{"X-Test-Header-1":"Value1","X-Test-Header-2":"Value2"}}"#,
        );
        let (bin, urls) = client(reply);
        let headers = bin.headers().unwrap();
        assert_eq!(headers["X-Test-Header-1"], "Value1");
        assert_eq!(headers.len(), 2);
        assert_eq!(urls.lock().unwrap()[0], "https://httpbin.test/headers");
    }

    #[test]
    fn ip_and_user_agent_pick_one_member() {
        let (bin, urls) = client(HttpResponse::json(
            StatusCode::OK,
            r#"{"origin":"10.0.0.1","user-agent":"agent/1.0"}"#,
        ));
        assert_eq!(bin.ip_address().unwrap().as_deref(), Some("10.0.0.1"));
        assert_eq!(bin.user_agent().unwrap().as_deref(), Some("agent/1.0"));
        assert_eq!(
            *urls.lock().unwrap(),
            ["https://httpbin.test/ip", "https://httpbin.test/user-agent"]
        );

        let (bin, _) = client(HttpResponse::json(StatusCode::OK, r#"{"origin":null}"#));
        assert_eq!(bin.ip_address().unwrap(), None);
    }

    #[test]
    fn delete_resource_targets_delete_endpoint() {
        let (bin, urls) = client(HttpResponse::json(
            StatusCode::OK,
            r#"{"url":"https://httpbin.test/delete"}"#,
        ));
        assert_eq!(bin.delete_resource().unwrap().url, "https://httpbin.test/delete");
        assert_eq!(urls.lock().unwrap()[0], "https://httpbin.test/delete");
    }

    #[test]
    fn get_as_map_and_entity() {
        let (bin, _) = client(HttpResponse::json(
            StatusCode::OK,
            r#"{"url":"https://httpbin.test/get","origin":"127.0.0.1","headers":{}}"#,
        ));
        let map = bin.get_as_map().unwrap();
        assert!(["url", "headers", "origin"].iter().all(|k| map.contains_key(*k)));

        let entity = bin.get_with_response_entity().unwrap();
        assert!(entity.status().is_2xx_successful());
        assert_eq!(entity.body().unwrap().origin, "127.0.0.1");
    }

    #[test]
    fn get_with_params_encodes_values() {
        let (bin, urls) = client(HttpResponse::json(StatusCode::OK, "{}"));
        let params = BTreeMap::from([("city".to_string(), "New York".to_string())]);
        bin.get_with_params(&params).unwrap();
        assert_eq!(urls.lock().unwrap()[0], "https://httpbin.test/get?city=New+York");
    }
}
