//! Placeholder token scanning.
//!
//! # Grammar
//! ```text
//! token  := "{" ( ">" header+ | [ "~" | "?" ] word+ ) "}"
//! word   := [A-Za-z0-9_]
//! header := word | "-"
//! ```
//!
//! # Design Decisions
//! - Pattern compiled once per process, shared read-only
//! - Tokens are found regardless of whether they can be resolved
//! - No nesting: the first `}` closes the token

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?:>[A-Za-z0-9_-]+|[~?]?[A-Za-z0-9_]+)\}").unwrap());

/// Namespace selected by a token's leading character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
    /// `{>Name}`
    Header,
    /// `{~name}`
    Cookie,
    /// `{?name}`
    Query,
}

impl Sigil {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Sigil::Header),
            '~' => Some(Sigil::Cookie),
            '?' => Some(Sigil::Query),
            _ => None,
        }
    }
}

/// One placeholder occurrence inside a template.
///
/// Identity is the literal text: two tokens with the same text always
/// resolve to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderToken<'a> {
    text: &'a str,
    start: usize,
}

impl<'a> PlaceholderToken<'a> {
    /// Full token text including braces, e.g. `{>X-Forwarded-For}`.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the opening brace.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the closing brace.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn sigil(&self) -> Option<Sigil> {
        self.text[1..].chars().next().and_then(Sigil::from_char)
    }

    /// Token body without braces and sigil.
    pub fn name(&self) -> &'a str {
        let inner = &self.text[1..self.text.len() - 1];
        match self.sigil() {
            Some(_) => &inner[1..],
            None => inner,
        }
    }
}

/// Find every placeholder in `template`, left to right, duplicates included.
pub fn scan(template: &str) -> Vec<PlaceholderToken<'_>> {
    PLACEHOLDER_RE
        .find_iter(template)
        .map(|m| PlaceholderToken {
            text: m.as_str(),
            start: m.start(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(template: &str) -> Vec<&str> {
        scan(template).iter().map(|t| t.text()).collect()
    }

    #[test]
    fn test_scan_finds_all_forms_in_order() {
        let found = texts("https://{label1}.example.com/{>X-Forwarded-For}/{~sid}?q={?q}&x={1}&y={name}");
        assert_eq!(
            found,
            vec!["{label1}", "{>X-Forwarded-For}", "{~sid}", "{?q}", "{1}", "{name}"]
        );
    }

    #[test]
    fn test_scan_hyphenated_header_names() {
        let tokens = scan("ip={>X-Forwarded-For}&t={>X-Test}");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].sigil(), Some(Sigil::Header));
        assert_eq!(tokens[0].name(), "X-Forwarded-For");
        assert_eq!(tokens[1].name(), "X-Test");

        // Only header names may contain `-`
        assert!(scan("{~a-b}{?a-b}{a-b}").is_empty());
    }

    #[test]
    fn test_scan_keeps_duplicates() {
        assert_eq!(texts("{host}/{host}"), vec!["{host}", "{host}"]);
    }

    #[test]
    fn test_scan_ignores_non_tokens() {
        assert!(scan("plain text").is_empty());
        assert!(scan("{}").is_empty());
        assert!(scan("{>}").is_empty());
        assert!(scan("{a-b}").is_empty());
        assert!(scan("{$1}").is_empty());
        assert!(scan("{host").is_empty());
    }

    #[test]
    fn test_scan_no_nesting() {
        assert_eq!(texts("{{host}}"), vec!["{host}"]);
        assert_eq!(texts("{a}{b}"), vec!["{a}", "{b}"]);
    }

    #[test]
    fn test_token_parts() {
        let tokens = scan("x{>Accept}y{~sid}{?page}{path_escaped}");
        assert_eq!(tokens[0].sigil(), Some(Sigil::Header));
        assert_eq!(tokens[0].name(), "Accept");
        assert_eq!(tokens[0].start(), 1);
        assert_eq!(tokens[0].end(), 10);
        assert_eq!(tokens[1].sigil(), Some(Sigil::Cookie));
        assert_eq!(tokens[1].name(), "sid");
        assert_eq!(tokens[2].sigil(), Some(Sigil::Query));
        assert_eq!(tokens[2].name(), "page");
        assert_eq!(tokens[3].sigil(), None);
        assert_eq!(tokens[3].name(), "path_escaped");
    }
}
