//! Placeholder rendering errors.
//!
//! Only template authoring mistakes are errors. Missing request data (headers,
//! cookies, query parameters, named captures) never fails a render.

use thiserror::Error;

/// Errors that abort a render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    /// `{label0}`: labels are 1-based.
    #[error("{token} is not supported, labels start at 1")]
    InvalidLabelIndex { token: String },

    /// `{labelN}` where N exceeds the number of host labels.
    #[error("cannot use label {index}, host has only {labels} labels")]
    LabelIndexOutOfRange { index: usize, labels: usize },

    /// A token whose numeric part does not parse.
    #[error("malformed numeric placeholder {token}")]
    InvalidNumericToken { token: String },

    /// `{N}` used without any positional captures available.
    #[error("placeholder {{{index}}} needs regex captures, but none were supplied")]
    CaptureContextMissing { index: usize },

    /// `{N}` beyond the captures available.
    #[error("no such capture {index}, only {available} captured")]
    CaptureIndexOutOfRange { index: usize, available: usize },
}
