//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the redirect
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the redirect service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedirectConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Rule kinds to enable. Mutually exclusive with `disable`.
    pub enable: Option<Vec<RuleKind>>,

    /// Rule kinds to disable. Mutually exclusive with `enable`.
    pub disable: Option<Vec<RuleKind>>,

    /// Fallback location when no enabled rule matches.
    pub redirect: Option<String>,

    /// Redirect rules, each carrying a placeholder template.
    pub rules: Vec<RuleConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RedirectConfig {
    /// Rule kinds in effect after applying `enable` / `disable`.
    ///
    /// With neither set, every kind is enabled.
    pub fn enabled_kinds(&self) -> Vec<RuleKind> {
        match (&self.enable, &self.disable) {
            (Some(enable), _) => enable.clone(),
            (None, Some(disable)) => RuleKind::ALL
                .iter()
                .copied()
                .filter(|kind| !disable.contains(kind))
                .collect(),
            (None, None) => RuleKind::ALL.to_vec(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// What part of the request a rule keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Matches on host alone.
    Host,
    /// Matches on host, path prefix and an optional path pattern.
    Path,
}

impl RuleKind {
    pub const ALL: [RuleKind; 2] = [RuleKind::Host, RuleKind::Path];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Host => "host",
            RuleKind::Path => "path",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A redirect rule: match conditions plus the template to render.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Rule identifier for logging.
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: RuleKind,

    /// Host to match (case-insensitive, port ignored).
    pub host: Option<String>,

    /// Path prefix to match. Path rules only; defaults to "/".
    pub path_prefix: Option<String>,

    /// Regex matched against the request path. Path rules only.
    pub pattern: Option<String>,

    /// Destination template.
    pub to: String,

    /// Redirect status code.
    #[serde(default = "default_code")]
    pub code: u16,

    /// Rule priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,
}

fn default_kind() -> RuleKind {
    RuleKind::Host
}

fn default_code() -> u16 {
    301
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log destination: "stdout", "stderr", "" to discard, or a file path.
    pub log_output: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_output: "stdout".to_string(),
        }
    }
}
