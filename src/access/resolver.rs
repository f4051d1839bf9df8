//! Access decision facade
//!
//! Composes the rule set, pattern matching, and label evaluation into one
//! entry point. Authentication is checked strictly before labels, so an
//! unauthenticated caller always receives `not_authenticated`, never
//! `missing_labels`. Client redirect behavior (login prompt vs. forbidden
//! page) depends on that ordering.

use crate::access::evaluator::evaluate_labels;
use crate::access::store::{RuleSet, RuleStore};
use crate::access::types::{AccessDecision, AccessReason, Identity};
use tracing::{debug, trace};

/// Route access resolver
///
/// Holds one immutable rule set snapshot; decisions are pure reads over it.
pub struct AccessResolver {
    rules: RuleSet,
}

impl AccessResolver {
    /// Create a resolver by loading the store's current rules
    pub fn new(store: &RuleStore) -> Self {
        Self {
            rules: store.load(),
        }
    }

    /// Create a resolver over a fixed rule set (used by tests and embedders)
    pub fn from_rule_set(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Number of rules in force
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate access for a path and an optional authenticated identity.
    ///
    /// Unmatched paths are public. Never fails for expected outcomes; the
    /// verdict and its machine-readable reason are the return value.
    pub fn check_path(&self, path: &str, identity: Option<&Identity>) -> AccessDecision {
        debug!(path, authenticated = identity.is_some(), "Checking route access");

        let Some(rule) = self.rules.best_match(path) else {
            trace!(path, "No rule matched, path is public");
            return AccessDecision::allow(None);
        };

        if rule.require_login && identity.is_none() {
            trace!(path, pattern = %rule.pattern, "Denied: authentication required");
            return AccessDecision::deny(AccessReason::NotAuthenticated, Some(rule.clone()));
        }

        let caller_labels = identity.map(|i| i.labels.as_slice()).unwrap_or_default();
        if !evaluate_labels(Some(rule), caller_labels) {
            trace!(
                path,
                pattern = %rule.pattern,
                mode = %rule.labels_mode,
                "Denied: required labels not held"
            );
            return AccessDecision::deny(AccessReason::MissingLabels, Some(rule.clone()));
        }

        AccessDecision::allow(Some(rule.clone()))
    }
}
