//! Per-token resolution.
//!
//! # Precedence
//! 1. Request keywords (`{uri}`, `{host}`, ...)
//! 2. Host labels (`{labelN}`)
//! 3. Headers (`{>Name}`), unresolved when missing
//! 4. Cookies (`{~name}`), empty when missing
//! 5. Query parameters (`{?name}`), empty when missing
//! 6. Positional captures (`{N}`), error when missing
//! 7. Named captures (`{name}`), unresolved when missing
//!
//! `Ok(None)` means the token is left in the output as-is.

use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::placeholder::context::{RegexMatchContext, RequestContext};
use crate::placeholder::error::PlaceholderError;
use crate::placeholder::scanner::{PlaceholderToken, Sigil};

static CAPTURE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+[0-9]*$").unwrap());

const LABEL_PREFIX: &str = "label";

/// Everything except RFC 3986 unreserved characters.
const QUERY_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Request-derived keyword placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Uri,
    Dir,
    File,
    Host,
    HostOnly,
    Method,
    Path,
    PathEscaped,
    Port,
    Query,
    QueryEscaped,
    UriEscaped,
    User,
}

impl Keyword {
    pub fn parse(name: &str) -> Option<Self> {
        let keyword = match name {
            "uri" => Keyword::Uri,
            "dir" => Keyword::Dir,
            "file" => Keyword::File,
            "host" => Keyword::Host,
            "hostonly" => Keyword::HostOnly,
            "method" => Keyword::Method,
            "path" => Keyword::Path,
            "path_escaped" => Keyword::PathEscaped,
            "port" => Keyword::Port,
            "query" => Keyword::Query,
            "query_escaped" => Keyword::QueryEscaped,
            "uri_escaped" => Keyword::UriEscaped,
            "user" => Keyword::User,
            _ => return None,
        };
        Some(keyword)
    }

    fn value(self, request: &RequestContext<'_>) -> String {
        match self {
            Keyword::Uri => request.request_uri().to_string(),
            Keyword::Dir => split_path(request.path()).0.to_string(),
            Keyword::File => split_path(request.path()).1.to_string(),
            Keyword::Host => request.host().to_string(),
            Keyword::HostOnly => request.host_only().to_string(),
            Keyword::Method => request.method().to_string(),
            Keyword::Path => request.path().to_string(),
            Keyword::PathEscaped => query_escape(request.path()),
            Keyword::Port => request.port(),
            Keyword::Query => request.raw_query().to_string(),
            Keyword::QueryEscaped => query_escape(request.raw_query()),
            Keyword::UriEscaped => query_escape(request.request_uri()),
            Keyword::User => request.basic_auth_user().unwrap_or_default(),
        }
    }
}

/// Resolve one token against the request and capture context.
pub fn resolve(
    token: &PlaceholderToken<'_>,
    request: &RequestContext<'_>,
    captures: &RegexMatchContext,
) -> Result<Option<String>, PlaceholderError> {
    let name = token.name();

    match token.sigil() {
        Some(Sigil::Header) => return Ok(request.header_values(name)),
        Some(Sigil::Cookie) => {
            return Ok(Some(request.cookie(name).unwrap_or_default().to_string()))
        }
        Some(Sigil::Query) => return Ok(Some(request.query_param(name).unwrap_or_default())),
        None => {}
    }

    if let Some(keyword) = Keyword::parse(name) {
        return Ok(Some(keyword.value(request)));
    }

    if let Some(index) = name.strip_prefix(LABEL_PREFIX) {
        return resolve_label(token, index, request).map(Some);
    }

    if is_digits(name) {
        return resolve_positional(token, captures).map(Some);
    }

    if CAPTURE_NAME_RE.is_match(name) {
        let value = captures.named(name).map(str::to_string);
        if value.is_none() {
            tracing::trace!(token = token.text(), "named capture not found, leaving token");
        }
        return Ok(value);
    }

    tracing::trace!(token = token.text(), "unrecognised placeholder, leaving token");
    Ok(None)
}

/// Validate a label token's index without a request.
///
/// Returns the 1-based index.
pub fn label_index(token: &PlaceholderToken<'_>) -> Option<Result<usize, PlaceholderError>> {
    if token.sigil().is_some() || Keyword::parse(token.name()).is_some() {
        return None;
    }
    let index = token.name().strip_prefix(LABEL_PREFIX)?;
    Some(parse_label_index(token, index))
}

/// Whether the token addresses a positional capture (`{N}`).
pub fn is_positional(token: &PlaceholderToken<'_>) -> bool {
    token.sigil().is_none() && is_digits(token.name())
}

fn parse_label_index(token: &PlaceholderToken<'_>, index: &str) -> Result<usize, PlaceholderError> {
    let n = parse_index(token, index)?;
    if n < 1 {
        return Err(PlaceholderError::InvalidLabelIndex {
            token: token.text().to_string(),
        });
    }
    Ok(n)
}

fn resolve_label(
    token: &PlaceholderToken<'_>,
    index: &str,
    request: &RequestContext<'_>,
) -> Result<String, PlaceholderError> {
    let n = parse_label_index(token, index)?;
    let labels = request.labels();
    labels
        .get(n - 1)
        .map(|label| label.to_string())
        .ok_or(PlaceholderError::LabelIndexOutOfRange {
            index: n,
            labels: labels.len(),
        })
}

fn resolve_positional(
    token: &PlaceholderToken<'_>,
    captures: &RegexMatchContext,
) -> Result<String, PlaceholderError> {
    let index = parse_index(token, token.name())?;
    let positional = captures
        .positional()
        .ok_or(PlaceholderError::CaptureContextMissing { index })?;

    index
        .checked_sub(1)
        .and_then(|i| positional.get(i))
        .cloned()
        .ok_or(PlaceholderError::CaptureIndexOutOfRange {
            index,
            available: positional.len(),
        })
}

fn parse_index(token: &PlaceholderToken<'_>, digits: &str) -> Result<usize, PlaceholderError> {
    if !is_digits(digits) {
        return Err(PlaceholderError::InvalidNumericToken {
            token: token.text().to_string(),
        });
    }
    digits
        .parse()
        .map_err(|_| PlaceholderError::InvalidNumericToken {
            token: token.text().to_string(),
        })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Split after the final `/`: `("/a/b/", "c")` for `/a/b/c`.
fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => path.split_at(i + 1),
        None => ("", path),
    }
}

/// Query-component escaping with space as `+`.
fn query_escape(s: &str) -> String {
    s.split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_ESCAPE_SET).to_string())
        .collect::<Vec<_>>()
        .join("+")
}
