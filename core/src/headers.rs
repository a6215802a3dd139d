//! Ordered, multi-valued header store.
//!
//! # Design
//! Names keep their insertion order and are compared case-sensitively; both
//! are storage-level choices. Case-insensitive matching is left to the
//! transport. Flattened iteration yields `(name, value)` pairs in wire order.

use base64::Engine;

pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const TEXT_PLAIN: &str = "text/plain";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the values of `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Replace every value of `name` with `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = vec![value],
            None => self.entries.push((name, vec![value])),
        }
    }

    pub fn get(&self, name: &str) -> &[String] {
        self.position(name)
            .map(|idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Vec<String> {
        match self.position(name) {
            Some(idx) => self.entries.remove(idx).1,
            None => Vec::new(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Flattened `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append every pair of `other`, keeping values already present.
    pub fn extend_from(&mut self, other: &HttpHeaders) {
        for (name, value) in other.iter() {
            self.add(name, value);
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get_first(CONTENT_TYPE)
    }

    pub fn set_content_type(&mut self, media_type: &str) {
        self.set(CONTENT_TYPE, media_type);
    }

    pub fn set_accept(&mut self, media_type: &str) {
        self.set(ACCEPT, media_type);
    }

    pub fn set_basic_auth(&mut self, username: &str, password: &str) {
        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        self.set(AUTHORIZATION, format!("Basic {credentials}"));
    }

    pub fn set_bearer_auth(&mut self, token: &str) {
        self.set(AUTHORIZATION, format!("Bearer {token}"));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl<N, V> FromIterator<(N, V)> for HttpHeaders
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = HttpHeaders::new();
        for (name, value) in iter {
            headers.add(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_in_order() {
        let mut headers = HttpHeaders::new();
        headers.add("Accept", "text/html");
        headers.add("Accept", "application/json");
        assert_eq!(headers.get("Accept"), ["text/html", "application/json"]);
        assert_eq!(headers.get_first("Accept"), Some("text/html"));
    }

    #[test]
    fn set_replaces_all_values() {
        let mut headers = HttpHeaders::new();
        headers.add("X-Trace", "a");
        headers.add("X-Trace", "b");
        headers.set("X-Trace", "c");
        assert_eq!(headers.get("X-Trace"), ["c"]);
    }

    #[test]
    fn missing_name_is_empty_not_error() {
        let headers = HttpHeaders::new();
        assert!(headers.get("Nope").is_empty());
        assert_eq!(headers.get_first("Nope"), None);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut headers = HttpHeaders::new();
        headers.add("accept", "a");
        headers.add("Accept", "b");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("accept"), ["a"]);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let headers: HttpHeaders = [("Z", "1"), ("A", "2"), ("Z", "3")].into_iter().collect();
        assert_eq!(headers.names().collect::<Vec<_>>(), ["Z", "A"]);
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            [("Z", "1"), ("Z", "3"), ("A", "2")]
        );
    }

    #[test]
    fn extend_from_merges() {
        let mut base: HttpHeaders = [("Accept", "application/json")].into_iter().collect();
        let other: HttpHeaders = [("Accept", "text/plain"), ("X-Id", "7")].into_iter().collect();
        base.extend_from(&other);
        assert_eq!(base.get("Accept"), ["application/json", "text/plain"]);
        assert_eq!(base.get("X-Id"), ["7"]);
    }

    #[test]
    fn remove_returns_values() {
        let mut headers: HttpHeaders = [("A", "1"), ("A", "2")].into_iter().collect();
        assert_eq!(headers.remove("A"), ["1", "2"]);
        assert!(!headers.contains("A"));
        assert!(headers.remove("A").is_empty());
    }

    #[test]
    fn basic_auth_is_base64_encoded() {
        let mut headers = HttpHeaders::new();
        headers.set_basic_auth("user", "passwd");
        assert_eq!(headers.get_first(AUTHORIZATION), Some("Basic dXNlcjpwYXNzd2Q="));
        headers.set_bearer_auth("token123");
        assert_eq!(headers.get(AUTHORIZATION), ["Bearer token123"]);
    }
}
