//! Label authorization evaluation
//!
//! Pure function deciding whether a caller's labels satisfy a matched rule.

use crate::access::types::{LabelsMode, RouteRule};

/// Decide whether `caller_labels` satisfies the rule's label requirement.
///
/// An absent rule or an empty label list means no requirement. Matching is
/// case-sensitive exact string comparison.
pub fn evaluate_labels(rule: Option<&RouteRule>, caller_labels: &[String]) -> bool {
    let Some(rule) = rule else {
        return true;
    };
    if rule.labels.is_empty() {
        return true;
    }

    let holds = |required: &String| caller_labels.iter().any(|held| held == required);

    match rule.labels_mode {
        LabelsMode::All => rule.labels.iter().all(holds),
        LabelsMode::Any => rule.labels.iter().any(holds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(labels: &[&str], mode: LabelsMode) -> RouteRule {
        RouteRule {
            pattern: "/x".to_string(),
            require_login: false,
            labels: labels.iter().map(|s| s.to_string()).collect(),
            labels_mode: mode,
        }
    }

    fn held(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_absent_rule_passes() {
        assert!(evaluate_labels(None, &held(&[])));
    }

    #[test]
    fn test_empty_labels_pass() {
        let r = rule(&[], LabelsMode::All);
        assert!(evaluate_labels(Some(&r), &held(&[])));
    }

    #[test]
    fn test_any_mode() {
        let r = rule(&["adminx"], LabelsMode::Any);
        assert!(evaluate_labels(Some(&r), &held(&["adminx"])));
        assert!(evaluate_labels(Some(&r), &held(&["other", "adminx"])));
        assert!(!evaluate_labels(Some(&r), &held(&["other"])));
        assert!(!evaluate_labels(Some(&r), &held(&[])));
    }

    #[test]
    fn test_all_mode() {
        let r = rule(&["admin", "staff"], LabelsMode::All);
        assert!(evaluate_labels(Some(&r), &held(&["admin", "staff"])));
        assert!(evaluate_labels(Some(&r), &held(&["staff", "admin", "extra"])));
        assert!(!evaluate_labels(Some(&r), &held(&["admin"])));
        assert!(!evaluate_labels(Some(&r), &held(&[])));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let r = rule(&["Admin"], LabelsMode::Any);
        assert!(!evaluate_labels(Some(&r), &held(&["admin"])));
    }
}
