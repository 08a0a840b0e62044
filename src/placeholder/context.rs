//! Render inputs: the inbound request, upstream captures and path segments.
//!
//! All three are read-only during a render. `RequestContext` borrows the live
//! request instead of copying it.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::http::{header, HeaderMap, Method, Request, Uri};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};

/// Read-only view of an inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    method: &'a Method,
    uri: &'a Uri,
    headers: &'a HeaderMap,
    host: Cow<'a, str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self::new(req.method(), req.uri(), req.headers())
    }

    /// Build a context from request parts.
    ///
    /// The host is taken from the `Host` header, or from the URI authority
    /// when the header is missing (HTTP/2).
    pub fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        let host = headers
            .get(header::HOST)
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .or_else(|| {
                uri.authority()
                    .and_then(|a| a.as_str().rsplit('@').next())
                    .map(Cow::Borrowed)
            })
            .unwrap_or_default();

        Self {
            method,
            uri,
            headers,
            host,
        }
    }

    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Request target: path plus `?query` when present.
    pub fn request_uri(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn raw_query(&self) -> &str {
        self.uri.query().unwrap_or("")
    }

    /// Explicit port of the request URI, empty when none was given.
    pub fn port(&self) -> String {
        self.uri
            .port()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default()
    }

    /// Host header verbatim, port included.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host without a trailing `:port`.
    pub fn host_only(&self) -> &str {
        strip_port(&self.host)
    }

    /// Dot-separated labels of [`host_only`](Self::host_only), left to right.
    pub fn labels(&self) -> Vec<&str> {
        self.host_only().split('.').collect()
    }

    /// All values of a header joined with `,`. Lookup is case-insensitive.
    pub fn header_values(&self, name: &str) -> Option<String> {
        let values: Vec<Cow<'_, str>> = self
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    /// Value of the first cookie named exactly `name`.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| {
                let value = value.trim();
                value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value)
            })
    }

    /// First value of a query parameter, form-urldecoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.raw_query().as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Username from `Authorization: Basic ...`, if well formed.
    pub fn basic_auth_user(&self) -> Option<String> {
        let value = self.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, credentials) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(credentials.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, _password) = decoded.split_once(':')?;
        Some(user.to_string())
    }
}

/// Drop a trailing `:port`, leaving bracketed IPv6 literals intact.
pub(crate) fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if port.bytes().all(|b| b.is_ascii_digit())
                && (!name.contains(':') || name.ends_with(']')) =>
        {
            name
        }
        _ => host,
    }
}

/// Captures produced by an upstream pattern match.
///
/// Both forms are optional. A missing form is distinct from an index or name
/// that is simply not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexMatchContext {
    positional: Option<Vec<String>>,
    named: Option<HashMap<String, String>>,
}

impl RegexMatchContext {
    /// Context with neither positional nor named captures.
    pub fn none() -> Self {
        Self::default()
    }

    /// Capture groups 1..n become positional entries. Groups that did not
    /// participate are empty strings positionally and absent by name.
    pub fn from_captures(pattern: &Regex, captures: &Captures<'_>) -> Self {
        let positional = captures
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();

        let named = pattern
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Self {
            positional: Some(positional),
            named: Some(named),
        }
    }

    pub fn with_positional(mut self, captures: Vec<String>) -> Self {
        self.positional = Some(captures);
        self
    }

    pub fn with_named(mut self, captures: HashMap<String, String>) -> Self {
        self.named = Some(captures);
        self
    }

    pub fn positional(&self) -> Option<&[String]> {
        self.positional.as_deref()
    }

    /// Named capture value; `None` when the map is absent or lacks `name`.
    pub fn named(&self, name: &str) -> Option<&str> {
        self.named.as_ref()?.get(name).map(String::as_str)
    }
}

/// Path components supplied by upstream matching, addressed by `{$N}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSegments(Vec<String>);

impl PathSegments {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Split a path on `/`, dropping empty components.
    pub fn from_path(path: &str) -> Self {
        Self(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// 1-based access.
    pub fn get(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.0.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for PathSegments {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_host_and_port_stripping() {
        let req = request("/", &[("Host", "example.com:8080")]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.host(), "example.com:8080");
        assert_eq!(ctx.host_only(), "example.com");

        let req = request("/", &[("Host", "[::1]:443")]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.host_only(), "[::1]");

        let req = request("/", &[("Host", "[::1]")]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.host_only(), "[::1]");
    }

    #[test]
    fn test_host_falls_back_to_authority() {
        let req = request("http://fallback.example.org:81/x", &[]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.host(), "fallback.example.org:81");
        assert_eq!(ctx.port(), "81");
        assert_eq!(ctx.host_only(), "fallback.example.org");
        assert_eq!(ctx.labels(), vec!["fallback", "example", "org"]);
    }

    #[test]
    fn test_request_uri_and_query() {
        let req = request("/a/b?x=1&y=two%20words", &[]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.request_uri(), "/a/b?x=1&y=two%20words");
        assert_eq!(ctx.path(), "/a/b");
        assert_eq!(ctx.raw_query(), "x=1&y=two%20words");
        assert_eq!(ctx.query_param("y").as_deref(), Some("two words"));
        assert_eq!(ctx.query_param("z"), None);
        assert_eq!(ctx.port(), "");
    }

    #[test]
    fn test_headers_case_insensitive_and_joined() {
        let req = request("/", &[("X-Test", "a"), ("x-test", "b")]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.header_values("X-TEST").as_deref(), Some("a,b"));
        assert_eq!(ctx.header_values("X-Missing"), None);
    }

    #[test]
    fn test_cookies() {
        let req = request(
            "/",
            &[("Cookie", "theme=dark; session=\"xyz\""), ("Cookie", "other=1")],
        );
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.cookie("session"), Some("xyz"));
        assert_eq!(ctx.cookie("theme"), Some("dark"));
        assert_eq!(ctx.cookie("other"), Some("1"));
        assert_eq!(ctx.cookie("Session"), None);
    }

    #[test]
    fn test_basic_auth_user() {
        // "alice:secret"
        let req = request("/", &[("Authorization", "Basic YWxpY2U6c2VjcmV0")]);
        assert_eq!(
            RequestContext::from_request(&req).basic_auth_user().as_deref(),
            Some("alice")
        );

        let req = request("/", &[("Authorization", "Bearer token")]);
        assert_eq!(RequestContext::from_request(&req).basic_auth_user(), None);

        let req = request("/", &[("Authorization", "Basic !!!")]);
        assert_eq!(RequestContext::from_request(&req).basic_auth_user(), None);
    }

    #[test]
    fn test_regex_match_context_from_captures() {
        let pattern = Regex::new(r"^/(?P<lang>[a-z]+)/(\d+)?(x)?").unwrap();
        let caps = pattern.captures("/en/42").unwrap();
        let ctx = RegexMatchContext::from_captures(&pattern, &caps);

        assert_eq!(
            ctx.positional(),
            Some(&["en".to_string(), "42".to_string(), String::new()][..])
        );
        assert_eq!(ctx.named("lang"), Some("en"));
        assert_eq!(ctx.named("missing"), None);
    }

    #[test]
    fn test_regex_match_context_absent_forms() {
        let ctx = RegexMatchContext::none();
        assert_eq!(ctx.positional(), None);
        assert_eq!(ctx.named("anything"), None);

        let ctx = RegexMatchContext::none().with_positional(vec![]);
        assert_eq!(ctx.positional(), Some(&[][..]));
    }

    #[test]
    fn test_path_segments() {
        let segments = PathSegments::from_path("/docs//guide/intro/");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments.get(0), None);
        assert_eq!(segments.get(1), Some("docs"));
        assert_eq!(segments.get(3), Some("intro"));
        assert_eq!(segments.get(4), None);
        assert!(PathSegments::default().is_empty());
    }
}
