//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check enable/disable option lists
//! - Check rule fields against their kind
//! - Catch template mistakes that would fail every render
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RedirectConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{RedirectConfig, RuleConfig, RuleKind};
use crate::placeholder::resolver::{is_positional, label_index};
use crate::placeholder::scan;

/// Redirect status codes a rule may use.
pub const REDIRECT_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("`enable` and `disable` cannot both be set")]
    EnableAndDisable,

    #[error("`{0}` must list at least one rule kind")]
    EmptyOptionList(&'static str),

    #[error("fallback redirect must not be empty")]
    EmptyFallback,

    #[error("rule name must not be empty")]
    EmptyRuleName,

    #[error("duplicate rule name `{0}`")]
    DuplicateRuleName(String),

    #[error("rule `{0}` has an empty destination")]
    EmptyDestination(String),

    #[error("rule `{rule}` uses status {code}, expected one of 301, 302, 303, 307, 308")]
    InvalidStatusCode { rule: String, code: u16 },

    #[error("rule `{rule}` sets `{field}`, which only applies to path rules")]
    PathOnlyField { rule: String, field: &'static str },

    #[error("rule `{rule}` has an invalid path prefix `{prefix}`, it must start with `/`")]
    InvalidPathPrefix { rule: String, prefix: String },

    #[error("rule `{rule}` has an invalid pattern: {reason}")]
    InvalidPattern { rule: String, reason: String },

    #[error("rule `{rule}` destination is invalid: {reason}")]
    InvalidTemplate { rule: String, reason: String },

    #[error("rule `{rule}` uses capture {token} but has no pattern")]
    CaptureWithoutPattern { rule: String, token: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RedirectConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    match (&config.enable, &config.disable) {
        (Some(_), Some(_)) => errors.push(ValidationError::EnableAndDisable),
        (Some(list), None) if list.is_empty() => {
            errors.push(ValidationError::EmptyOptionList("enable"))
        }
        (None, Some(list)) if list.is_empty() => {
            errors.push(ValidationError::EmptyOptionList("disable"))
        }
        _ => {}
    }

    if config.redirect.as_deref().is_some_and(|r| r.trim().is_empty()) {
        errors.push(ValidationError::EmptyFallback);
    }

    let mut names = HashSet::new();
    for rule in &config.rules {
        if rule.name.is_empty() {
            errors.push(ValidationError::EmptyRuleName);
        } else if !names.insert(rule.name.as_str()) {
            errors.push(ValidationError::DuplicateRuleName(rule.name.clone()));
        }
        validate_rule(rule, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rule(rule: &RuleConfig, errors: &mut Vec<ValidationError>) {
    if rule.to.trim().is_empty() {
        errors.push(ValidationError::EmptyDestination(rule.name.clone()));
    }

    if !REDIRECT_CODES.contains(&rule.code) {
        errors.push(ValidationError::InvalidStatusCode {
            rule: rule.name.clone(),
            code: rule.code,
        });
    }

    if rule.kind != RuleKind::Path {
        if rule.path_prefix.is_some() {
            errors.push(ValidationError::PathOnlyField {
                rule: rule.name.clone(),
                field: "path_prefix",
            });
        }
        if rule.pattern.is_some() {
            errors.push(ValidationError::PathOnlyField {
                rule: rule.name.clone(),
                field: "pattern",
            });
        }
    }

    if let Some(prefix) = &rule.path_prefix {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPathPrefix {
                rule: rule.name.clone(),
                prefix: prefix.clone(),
            });
        }
    }

    if let Some(pattern) = &rule.pattern {
        if let Err(e) = Regex::new(pattern) {
            errors.push(ValidationError::InvalidPattern {
                rule: rule.name.clone(),
                reason: e.to_string(),
            });
        }
    }

    for token in scan(&rule.to) {
        if let Some(Err(e)) = label_index(&token) {
            errors.push(ValidationError::InvalidTemplate {
                rule: rule.name.clone(),
                reason: e.to_string(),
            });
        }
        if is_positional(&token) && rule.pattern.is_none() {
            errors.push(ValidationError::CaptureWithoutPattern {
                rule: rule.name.clone(),
                token: token.text().to_string(),
            });
        }
    }
}
