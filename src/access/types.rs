//! Access control types
//!
//! Core types used by the route access-control system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a rule's required labels are evaluated against the caller's labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelsMode {
    /// At least one required label must be held (default)
    #[default]
    Any,
    /// Every required label must be held
    All,
}

impl LabelsMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LabelsMode::Any => "any",
            LabelsMode::All => "all",
        }
    }
}

impl fmt::Display for LabelsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declarative access policy for a path pattern
///
/// Immutable once loaded; a reload replaces the whole rule set snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Glob pattern: `*` matches one path segment, `**` matches any number
    /// of segments. A trailing `/**` also matches the bare prefix itself.
    pub pattern: String,

    /// Deny unauthenticated callers regardless of labels
    #[serde(default)]
    pub require_login: bool,

    /// Required authorization labels; empty means no label requirement
    #[serde(default)]
    pub labels: Vec<String>,

    /// How `labels` is evaluated against the caller's labels
    #[serde(default)]
    pub labels_mode: LabelsMode,
}

impl RouteRule {
    /// Create a rule for a pattern with no further requirements
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            require_login: false,
            labels: Vec::new(),
            labels_mode: LabelsMode::Any,
        }
    }

    /// Normalize a raw candidate rule from a rule document.
    ///
    /// Malformed fields degrade instead of failing the load: a missing or
    /// non-string `pattern` becomes the empty string (such a rule matches
    /// nothing and is inert), a non-boolean `require_login` becomes false,
    /// a non-array `labels` becomes empty and non-string entries are
    /// dropped, and `labels_mode` is `all` only on that exact string.
    ///
    /// Both snake_case and camelCase field spellings are accepted, so rule
    /// documents exported from other tooling normalize identically.
    pub fn normalize(value: &toml::Value) -> Self {
        let pattern = value
            .get("pattern")
            .and_then(toml::Value::as_str)
            .unwrap_or_default()
            .to_string();

        let require_login = field(value, "require_login", "requireLogin")
            .and_then(toml::Value::as_bool)
            .unwrap_or(false);

        let labels = value
            .get("labels")
            .and_then(toml::Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(toml::Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let labels_mode = match field(value, "labels_mode", "labelsMode")
            .and_then(toml::Value::as_str)
        {
            Some("all") => LabelsMode::All,
            _ => LabelsMode::Any,
        };

        Self {
            pattern,
            require_login,
            labels,
            labels_mode,
        }
    }

    /// Whether this rule carries a label requirement
    pub fn has_label_requirement(&self) -> bool {
        !self.labels.is_empty()
    }
}

fn field<'v>(value: &'v toml::Value, snake: &str, camel: &str) -> Option<&'v toml::Value> {
    value.get(snake).or_else(|| value.get(camel))
}

/// Minimal caller identity consumed from the external identity provider
///
/// `None` at the API boundary represents an unauthenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Authorization labels held by the caller
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Identity {
    /// Create an identity holding the given labels
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            email: None,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Machine-readable outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    /// Access granted
    Ok,
    /// Rule requires login and the caller is unauthenticated
    NotAuthenticated,
    /// Caller does not hold the rule's required labels
    MissingLabels,
}

impl AccessReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessReason::Ok => "ok",
            AccessReason::NotAuthenticated => "not_authenticated",
            AccessReason::MissingLabels => "missing_labels",
        }
    }
}

impl fmt::Display for AccessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of evaluating one (path, identity) pair
///
/// Computed fresh per call, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
    /// The rule that was matched; absent when no rule matched the path
    pub rule: Option<RouteRule>,
}

impl AccessDecision {
    pub fn allow(rule: Option<RouteRule>) -> Self {
        Self {
            allowed: true,
            reason: AccessReason::Ok,
            rule,
        }
    }

    pub fn deny(reason: AccessReason, rule: Option<RouteRule>) -> Self {
        Self {
            allowed: false,
            reason,
            rule,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn is_denied(&self) -> bool {
        !self.allowed
    }
}
