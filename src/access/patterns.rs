//! Glob pattern compilation for route rules
//!
//! Translates glob-style path patterns into anchored regexes and computes
//! the specificity key used to pick a winner when several rules match.

use crate::error::ConfigError;
use regex::Regex;

/// Specificity key for tie-breaking between matching rules.
///
/// Ordered by count of non-wildcard pattern characters, then by raw pattern
/// length. More literal characters means a more specific rule; `/admin/secure/**`
/// beats `/admin/**` for `/admin/secure/x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    literal_chars: usize,
    pattern_len: usize,
}

impl Specificity {
    fn of(pattern: &str) -> Self {
        Self {
            literal_chars: pattern.chars().filter(|c| *c != '*').count(),
            pattern_len: pattern.len(),
        }
    }
}

/// Compiled matcher for a single route pattern
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    source: String,
    /// None for the empty pattern, which matches nothing
    regex: Option<Regex>,
    specificity: Specificity,
}

impl RouteMatcher {
    /// Compile a glob pattern into a matcher.
    ///
    /// `*` matches one path segment (no `/`), `**` matches any sequence of
    /// segments. A pattern ending in `/**` additionally matches the bare
    /// prefix, so `/admin/**` covers `/admin` itself. All other characters
    /// match literally.
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let specificity = Specificity::of(pattern);

        if pattern.is_empty() {
            return Ok(Self {
                source: String::new(),
                regex: None,
                specificity,
            });
        }

        let body = match pattern.strip_suffix("/**") {
            // The section root is covered too: equal to the prefix, or
            // anything below it.
            Some(prefix) => format!("{}(/.*)?", translate(prefix)),
            None => translate(pattern),
        };

        let regex = Regex::new(&format!("^{body}$")).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex: Some(regex),
            specificity,
        })
    }

    /// Check whether a request path matches this pattern
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(path))
    }

    /// The raw pattern this matcher was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }
}

/// Translate glob syntax into a regex fragment, escaping everything else
fn translate(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(".*");
                } else {
                    out.push_str("[^/]*");
                }
            }
            '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '?' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(pattern: &str) -> RouteMatcher {
        RouteMatcher::compile(pattern).unwrap()
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let m = matcher("");
        assert!(!m.is_match(""));
        assert!(!m.is_match("/"));
        assert!(!m.is_match("/anything"));
    }

    #[test]
    fn test_literal_pattern_exact_only() {
        let m = matcher("/about");
        assert!(m.is_match("/about"));
        assert!(!m.is_match("/about/team"));
        assert!(!m.is_match("/aboutx"));
        assert!(!m.is_match("/abou"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let m = matcher("/a.b");
        assert!(m.is_match("/a.b"));
        assert!(!m.is_match("/axb"));

        let m = matcher("/files/v1.2+beta");
        assert!(m.is_match("/files/v1.2+beta"));
        assert!(!m.is_match("/files/v1x2+beta"));
    }

    #[test]
    fn test_single_star_stays_within_segment() {
        let m = matcher("/users/*/profile");
        assert!(m.is_match("/users/alice/profile"));
        assert!(m.is_match("/users//profile"));
        assert!(!m.is_match("/users/alice/settings/profile"));
    }

    #[test]
    fn test_trailing_double_star_includes_root() {
        let m = matcher("/admin/**");
        assert!(m.is_match("/admin"));
        assert!(m.is_match("/admin/users"));
        assert!(m.is_match("/admin/users/42/edit"));
        assert!(!m.is_match("/administrator"));
        assert!(!m.is_match("/adm"));
    }

    #[test]
    fn test_inner_double_star_spans_segments() {
        let m = matcher("/docs/**/index");
        assert!(m.is_match("/docs/a/b/index"));
        assert!(m.is_match("/docs//index"));
        assert!(!m.is_match("/docs/a/b/other"));
    }

    #[test]
    fn test_wildcards_inside_trailing_prefix() {
        let m = matcher("/tenants/*/admin/**");
        assert!(m.is_match("/tenants/acme/admin"));
        assert!(m.is_match("/tenants/acme/admin/users"));
        assert!(!m.is_match("/tenants/acme/other"));
    }

    #[test]
    fn test_specificity_ordering() {
        let broad = matcher("/admin/**");
        let narrow = matcher("/admin/secure/**");
        assert!(narrow.specificity() > broad.specificity());

        // Same literal count falls back to raw length
        let a = Specificity::of("/ab*");
        let b = Specificity::of("/ab**");
        assert!(b > a);
    }
}
