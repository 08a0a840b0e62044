//! Rule lookup.
//!
//! # Responsibilities
//! - Store compiled rules
//! - Look up the matching rule for a request
//! - Produce the capture context and path segments the template needs
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in priority order, first match wins
//! - Ties keep config file order
//! - Explicit no-match rather than silent default

use axum::http::StatusCode;
use regex::Regex;
use thiserror::Error;

use crate::config::schema::{RuleConfig, RuleKind};
use crate::placeholder::{PathSegments, RegexMatchContext, RequestContext};
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, PathPrefixMatcher};

/// Errors compiling rules into a table.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("rule `{rule}` has an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule `{rule}` has non-redirect status code {code}")]
    InvalidStatusCode { rule: String, code: u16 },
}

/// A rule ready for matching.
#[derive(Debug)]
pub struct CompiledRule {
    pub name: String,
    pub kind: RuleKind,
    pub template: String,
    pub code: StatusCode,
    priority: u32,
    conditions: AndMatcher,
    prefix: PathPrefixMatcher,
    pattern: Option<Regex>,
}

impl CompiledRule {
    fn compile(config: &RuleConfig) -> Result<Self, RoutingError> {
        let code = StatusCode::from_u16(config.code)
            .ok()
            .filter(StatusCode::is_redirection)
            .ok_or_else(|| RoutingError::InvalidStatusCode {
                rule: config.name.clone(),
                code: config.code,
            })?;

        let pattern = config
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| RoutingError::InvalidPattern {
                rule: config.name.clone(),
                source,
            })?;

        let prefix = PathPrefixMatcher::new(config.path_prefix.as_deref().unwrap_or("/"));

        let mut conditions: Vec<Box<dyn Matcher>> = Vec::new();
        if let Some(host) = &config.host {
            conditions.push(Box::new(HostMatcher::new(host.as_str())));
        }
        conditions.push(Box::new(prefix.clone()));

        Ok(Self {
            name: config.name.clone(),
            kind: config.kind,
            template: config.to.clone(),
            code,
            priority: config.priority,
            conditions: AndMatcher::new(conditions),
            prefix,
            pattern,
        })
    }

    fn evaluate(&self, req: &RequestContext<'_>) -> Option<RouteMatch<'_>> {
        if !self.conditions.matches(req) {
            return None;
        }

        let captures = match &self.pattern {
            Some(pattern) => {
                let caps = pattern.captures(req.path())?;
                RegexMatchContext::from_captures(pattern, &caps)
            }
            None => RegexMatchContext::none(),
        };

        let remainder = self.prefix.strip(req.path()).unwrap_or_default();

        Some(RouteMatch {
            rule: self,
            captures,
            segments: PathSegments::from_path(remainder),
        })
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'r> {
    pub rule: &'r CompiledRule,
    pub captures: RegexMatchContext,
    pub segments: PathSegments,
}

/// Compiled, priority-ordered rule table.
#[derive(Debug, Default)]
pub struct RedirectTable {
    rules: Vec<CompiledRule>,
}

impl RedirectTable {
    pub fn from_config(rules: &[RuleConfig]) -> Result<Self, RoutingError> {
        let mut rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        // Stable sort keeps file order among equal priorities
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        Ok(Self { rules })
    }

    /// First rule, by priority, whose conditions and pattern match.
    pub fn match_request(&self, req: &RequestContext<'_>) -> Option<RouteMatch<'_>> {
        self.rules.iter().find_map(|rule| rule.evaluate(req))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn rule(name: &str, host: Option<&str>, to: &str, priority: u32) -> RuleConfig {
        RuleConfig {
            name: name.into(),
            kind: RuleKind::Host,
            host: host.map(Into::into),
            path_prefix: None,
            pattern: None,
            to: to.into(),
            code: 301,
            priority,
        }
    }

    fn request(host: &str, uri: &str) -> Request<()> {
        Request::builder().uri(uri).header("Host", host).body(()).unwrap()
    }

    #[test]
    fn test_priority_then_file_order() {
        let table = RedirectTable::from_config(&[
            rule("catch-all", None, "https://fallback", 0),
            rule("first", Some("example.com"), "https://one", 10),
            rule("second", Some("example.com"), "https://two", 10),
        ])
        .unwrap();
        assert_eq!(table.len(), 3);

        let req = request("example.com", "/");
        let ctx = RequestContext::from_request(&req);
        assert_eq!(table.match_request(&ctx).unwrap().rule.name, "first");

        let req = request("other.com", "/");
        let ctx = RequestContext::from_request(&req);
        assert_eq!(table.match_request(&ctx).unwrap().rule.name, "catch-all");
    }

    #[test]
    fn test_no_match() {
        let table = RedirectTable::from_config(&[rule("a", Some("a.com"), "x", 0)]).unwrap();
        let req = request("b.com", "/");
        assert!(table.match_request(&RequestContext::from_request(&req)).is_none());
        assert!(RedirectTable::default().is_empty());
    }

    #[test]
    fn test_path_rule_captures_and_segments() {
        let mut config = rule("docs", Some("docs.example.com"), "https://x/{1}/{lang}", 0);
        config.kind = RuleKind::Path;
        config.path_prefix = Some("/guide".into());
        config.pattern = Some(r"^/guide/(?P<lang>[a-z]{2})/(.+)$".into());
        config.code = 307;
        let table = RedirectTable::from_config(&[config]).unwrap();

        let req = request("docs.example.com", "/guide/en/intro/setup");
        let ctx = RequestContext::from_request(&req);
        let matched = table.match_request(&ctx).unwrap();
        assert_eq!(matched.rule.code, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(matched.captures.named("lang"), Some("en"));
        assert_eq!(
            matched.captures.positional(),
            Some(&["en".to_string(), "intro/setup".to_string()][..])
        );
        assert_eq!(matched.segments.get(1), Some("en"));
        assert_eq!(matched.segments.get(3), Some("setup"));

        // Prefix matches but pattern does not
        let req = request("docs.example.com", "/guide/english");
        assert!(table.match_request(&RequestContext::from_request(&req)).is_none());
    }

    #[test]
    fn test_prefix_matches_whole_segments_only() {
        let mut config = rule("r", Some("example.com"), "https://x/{$1}", 0);
        config.kind = RuleKind::Path;
        config.path_prefix = Some("/r".into());
        let table = RedirectTable::from_config(&[config]).unwrap();

        let req = request("example.com", "/rx/foo");
        assert!(table.match_request(&RequestContext::from_request(&req)).is_none());

        let req = request("example.com", "/r/foo/bar");
        let ctx = RequestContext::from_request(&req);
        let matched = table.match_request(&ctx).unwrap();
        assert_eq!(matched.segments.get(1), Some("foo"));
        assert_eq!(matched.segments.get(2), Some("bar"));
    }

    #[test]
    fn test_host_with_port_matches() {
        let table =
            RedirectTable::from_config(&[rule("a", Some("example.com:8080"), "x", 0)]).unwrap();
        let req = request("example.com:8080", "/");
        assert!(table.match_request(&RequestContext::from_request(&req)).is_some());
    }

    #[test]
    fn test_compile_errors() {
        let mut bad_pattern = rule("p", None, "x", 0);
        bad_pattern.pattern = Some("(".into());
        assert!(matches!(
            RedirectTable::from_config(&[bad_pattern]),
            Err(RoutingError::InvalidPattern { .. })
        ));

        let mut bad_code = rule("c", None, "x", 0);
        bad_code.code = 200;
        assert!(matches!(
            RedirectTable::from_config(&[bad_code]),
            Err(RoutingError::InvalidStatusCode { code: 200, .. })
        ));
    }
}
