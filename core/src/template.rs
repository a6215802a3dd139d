//! URI template expansion and query-string assembly.
//!
//! Expansion is purely textual: `{token}` placeholders are replaced in one
//! left-to-right pass, substituted text is never re-scanned, and unmatched
//! tokens are kept verbatim. Nothing is percent-encoded here; only query
//! parameters added through [`QueryParams`] are encoded.

use std::fmt::Display;

use url::form_urlencoded;

/// Replace `{0}`, `{1}`, … with the matching positional argument.
///
/// Tokens whose index is out of range, and tokens that are not plain
/// integers, stay as literal text.
pub fn expand_positional(template: &str, args: &[&dyn Display]) -> String {
    expand(template, |token| {
        token
            .parse::<usize>()
            .ok()
            .and_then(|idx| args.get(idx))
            .map(|arg| arg.to_string())
    })
}

/// Replace `{name}` tokens with the value registered for `name`.
pub fn expand_named(template: &str, vars: &[(&str, &dyn Display)]) -> String {
    expand(template, |token| {
        vars.iter()
            .find(|(name, _)| *name == token)
            .map(|(_, value)| value.to_string())
    })
}

fn expand(template: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = match after.find(['{', '}']) {
            Some(pos) if after.as_bytes()[pos] == b'}' => pos,
            // Unterminated, or another `{` before the `}`: emit the brace and
            // keep scanning after it.
            _ => {
                out.push('{');
                rest = after;
                continue;
            }
        };
        let token = &after[..close];
        match lookup(token) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('{');
                out.push_str(token);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Ordered query parameters, encoded as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Append the encoded parameters to `url`, respecting an existing `?`.
    pub fn append_to(&self, url: &str) -> String {
        if self.is_empty() {
            return url.to_string();
        }
        // The query always precedes any `#fragment`.
        let (base, fragment) = match url.find('#') {
            Some(at) => url.split_at(at),
            None => (url, ""),
        };
        let sep = if !base.contains('?') {
            "?"
        } else if base.ends_with('?') || base.ends_with('&') {
            ""
        } else {
            "&"
        };
        format!("{base}{sep}{}{fragment}", self.encode())
    }
}

/// A value that knows how to contribute query parameters to a request.
///
/// Lets structured search/filter objects be passed straight to a request
/// builder instead of being unpacked at every call site.
pub trait QueryArgument {
    fn resolve(&self, params: &mut QueryParams);
}

/// Join a base URL and a request URI.
///
/// Absolute URIs are used as-is. Otherwise the two are concatenated with
/// exactly one `/` between them, unless the URI starts with `?` or `#`.
pub fn join_url(base_url: &str, uri: &str) -> String {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return uri.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if uri.is_empty() {
        return base_url.to_string();
    }
    if uri.starts_with('/') || uri.starts_with('?') || uri.starts_with('#') || base.is_empty() {
        format!("{base}{uri}")
    } else {
        format!("{base}/{uri}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_substitution_in_order() {
        assert_eq!(expand_positional("/x/{0}/{1}", &[&"a", &7]), "/x/a/7");
        assert_eq!(expand_positional("/{1}/{0}/{1}", &[&"a", &"b"]), "/b/a/b");
    }

    #[test]
    fn out_of_range_tokens_stay_literal() {
        assert_eq!(expand_positional("/x/{5}", &[&"a"]), "/x/{5}");
        assert_eq!(expand_positional("/x/{id}", &[&"a"]), "/x/{id}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        assert_eq!(expand_positional("/{0}/{1}", &[&"{1}", &"z"]), "/{1}/z");
    }

    #[test]
    fn no_escaping_is_applied() {
        assert_eq!(expand_positional("/q/{0}", &[&"a b/c"]), "/q/a b/c");
    }

    #[test]
    fn stray_braces_are_kept() {
        assert_eq!(expand_positional("/{{0}", &[&"a"]), "/{a");
        assert_eq!(expand_positional("/{0", &[&"a"]), "/{0");
        assert_eq!(expand_positional("/}{0}", &[&"a"]), "/}a");
    }

    #[test]
    fn named_substitution() {
        let id = 42;
        assert_eq!(
            expand_named("/users/{id}/{missing}", &[("id", &id)]),
            "/users/42/{missing}"
        );
    }

    #[test]
    fn query_params_are_encoded_and_appended() {
        let mut params = QueryParams::new();
        params.add("name", "New York");
        params.add("age", "30");
        assert_eq!(params.append_to("/get"), "/get?name=New+York&age=30");
        assert_eq!(params.append_to("/get?x=1"), "/get?x=1&name=New+York&age=30");
        assert_eq!(QueryParams::new().append_to("/get"), "/get");
    }

    #[test]
    fn append_keeps_fragment_last() {
        let mut params = QueryParams::new();
        params.add("q", "1");
        assert_eq!(params.append_to("https://api.test/x#top"), "https://api.test/x?q=1#top");
        assert_eq!(params.append_to("/x?a=2#top"), "/x?a=2&q=1#top");
        assert_eq!(params.append_to("/x#a?b"), "/x?q=1#a?b");
    }

    #[test]
    fn join_url_variants() {
        assert_eq!(join_url("https://api.test", "/users/42"), "https://api.test/users/42");
        assert_eq!(join_url("https://api.test/", "/users"), "https://api.test/users");
        assert_eq!(join_url("https://api.test", "users"), "https://api.test/users");
        assert_eq!(join_url("", "https://httpbin.org/get"), "https://httpbin.org/get");
        assert_eq!(join_url("https://api.test", "http://other/x"), "http://other/x");
        assert_eq!(join_url("https://api.test", ""), "https://api.test");
        assert_eq!(join_url("", "/relative"), "/relative");
    }
}
