//! Template rendering.
//!
//! # Algorithm
//! 1. Scan the template once.
//! 2. Resolve each distinct token in first-occurrence order, stopping at the
//!    first error.
//! 3. Splice resolved values into the template. Unresolved tokens stay literal.
//! 4. Replace `{$N}` with the Nth path segment; missing segments stay literal.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::placeholder::context::{PathSegments, RegexMatchContext, RequestContext};
use crate::placeholder::error::PlaceholderError;
use crate::placeholder::resolver::resolve;
use crate::placeholder::scanner::scan;

static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\$([0-9]+)\}").unwrap());

/// Render `template` against a request and upstream match context.
///
/// Returns no partial output on error.
pub fn render(
    template: &str,
    request: &RequestContext<'_>,
    captures: &RegexMatchContext,
    segments: &PathSegments,
) -> Result<String, PlaceholderError> {
    let tokens = scan(template);

    let mut resolved: HashMap<&str, Option<String>> = HashMap::with_capacity(tokens.len());
    for token in &tokens {
        if resolved.contains_key(token.text()) {
            continue;
        }
        let value = resolve(token, request, captures).inspect_err(|e| {
            tracing::trace!(token = token.text(), error = %e, "placeholder failed");
        })?;
        resolved.insert(token.text(), value);
    }

    let mut output = String::with_capacity(template.len());
    let mut last = 0;
    for token in &tokens {
        output.push_str(&template[last..token.start()]);
        match resolved.get(token.text()) {
            Some(Some(value)) => output.push_str(value),
            _ => output.push_str(token.text()),
        }
        last = token.end();
    }
    output.push_str(&template[last..]);

    Ok(substitute_segments(&output, segments))
}

fn substitute_segments(input: &str, segments: &PathSegments) -> String {
    if segments.is_empty() {
        return input.to_string();
    }

    SEGMENT_RE
        .replace_all(input, |caps: &Captures<'_>| {
            let digits = &caps[1];
            digits
                .parse::<usize>()
                .ok()
                // `{$01}` is not `{$1}`
                .filter(|n| n.to_string() == digits)
                .and_then(|n| segments.get(n))
                .unwrap_or(&caps[0])
                .to_string()
        })
        .into_owned()
}
