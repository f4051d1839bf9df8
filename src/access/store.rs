//! Rule store and rule sources
//!
//! Loads candidate rules from an explicit list of sources, normalizes them,
//! deduplicates by pattern, and compiles the result into an immutable
//! [`RuleSet`] snapshot. Loading never fails: a source that cannot be read
//! or parsed contributes zero rules.

use crate::access::patterns::RouteMatcher;
use crate::access::types::RouteRule;
use crate::config::RulesConfig;
use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default rule document paths to probe when none are configured (in order,
/// first existing one wins)
const DEFAULT_RULE_PATHS: &[&str] = &[
    "routes.toml",
    ".routes.toml",
    "~/.config/routeguard/routes.toml",
    "/etc/routeguard/routes.toml",
];

/// Built-in rule set used when no rule source can be discovered at all
const DEFAULT_RULES: &str = r#"
[[rules]]
pattern = "/admin/**"
require_login = true
labels = ["adminx"]

[[rules]]
pattern = "/test-protected"
require_login = true

[[rules]]
pattern = "/admin/secure/**"
require_login = true
labels = ["admin", "staff"]
labels_mode = "all"
"#;

/// A source of candidate route rules
///
/// Sources are injected explicitly so embedders and tests control discovery;
/// nothing here depends on ambient process state beyond the filesystem.
pub trait RuleSource: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> String;

    /// Produce raw candidate rules. Errors are swallowed by the store.
    fn load(&self) -> Result<Vec<toml::Value>, ConfigError>;
}

/// Rule source backed by a TOML document on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<toml::Value>, ConfigError> {
        let text = std::fs::read_to_string(&self.path)?;
        parse_rule_document(&text)
    }
}

/// Rule source holding pre-parsed candidate rules
pub struct StaticSource {
    name: String,
    rules: Vec<toml::Value>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, rules: Vec<toml::Value>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// The built-in default rule set
    pub fn embedded_defaults() -> Self {
        let rules = parse_rule_document(DEFAULT_RULES).unwrap_or_default();
        Self::new("<defaults>", rules)
    }
}

impl RuleSource for StaticSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Vec<toml::Value>, ConfigError> {
        Ok(self.rules.clone())
    }
}

/// Extract the `[[rules]]` array from a rule document
fn parse_rule_document(text: &str) -> Result<Vec<toml::Value>, ConfigError> {
    let value: toml::Value = text
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Load(e.to_string()))?;

    Ok(value
        .get("rules")
        .and_then(toml::Value::as_array)
        .cloned()
        .unwrap_or_default())
}

/// A compiled rule with its matcher
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: RouteRule,
    pub matcher: RouteMatcher,
}

/// The ordered, deduplicated collection of rules currently in force
///
/// Immutable after construction; enforcement points share one snapshot
/// behind an `Arc` for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Build a rule set from normalized rules, deduplicating by pattern
    /// (first-seen wins) and dropping rules whose pattern fails to compile.
    pub fn from_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = RouteRule>,
    {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();

        for rule in rules {
            if !seen.insert(rule.pattern.clone()) {
                debug!(pattern = %rule.pattern, "Discarding duplicate rule");
                continue;
            }
            match RouteMatcher::compile(&rule.pattern) {
                Ok(matcher) => compiled.push(CompiledRule { rule, matcher }),
                Err(e) => warn!(pattern = %rule.pattern, error = %e, "Dropping uncompilable rule"),
            }
        }

        Self { rules: compiled }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    /// Select the most specific rule whose pattern matches `path`.
    ///
    /// Specificity is the count of non-wildcard pattern characters, ties
    /// broken by raw pattern length; a full tie keeps the first-loaded rule.
    pub fn best_match(&self, path: &str) -> Option<&RouteRule> {
        let mut best: Option<&CompiledRule> = None;

        for candidate in &self.rules {
            if !candidate.matcher.is_match(path) {
                continue;
            }
            match best {
                Some(current)
                    if candidate.matcher.specificity() <= current.matcher.specificity() => {}
                _ => best = Some(candidate),
            }
        }

        best.map(|c| &c.rule)
    }
}

/// Loads route rules from an injectable list of sources
pub struct RuleStore {
    sources: Vec<Box<dyn RuleSource>>,
}

impl RuleStore {
    /// Create a store over an explicit list of sources
    pub fn new(sources: Vec<Box<dyn RuleSource>>) -> Self {
        Self { sources }
    }

    /// Discover sources from configuration.
    ///
    /// Configured paths are used as-is. With no configured paths, the
    /// well-known default locations are probed and the first existing one is
    /// used. When nothing is found the embedded default rule set stands in.
    pub fn discover(config: &RulesConfig) -> Self {
        let mut sources: Vec<Box<dyn RuleSource>> = Vec::new();

        if config.sources.is_empty() {
            for path in DEFAULT_RULE_PATHS {
                let expanded = shellexpand::tilde(path);
                if Path::new(expanded.as_ref()).exists() {
                    sources.push(Box::new(FileSource::new(expanded.as_ref())));
                    break;
                }
            }
        } else {
            for path in &config.sources {
                let expanded = shellexpand::tilde(path);
                sources.push(Box::new(FileSource::new(expanded.as_ref())));
            }
        }

        if sources.is_empty() {
            debug!("No rule sources discovered, using embedded defaults");
            sources.push(Box::new(StaticSource::embedded_defaults()));
        }

        Self { sources }
    }

    /// Load and compile the current rule set.
    ///
    /// Never fails: unreadable or malformed sources are skipped with a
    /// warning. If nothing loads, the set is empty and every path is public.
    pub fn load(&self) -> RuleSet {
        let mut raw = Vec::new();

        for source in &self.sources {
            match source.load() {
                Ok(mut values) => {
                    debug!(source = %source.name(), count = values.len(), "Loaded rule candidates");
                    raw.append(&mut values);
                }
                Err(e) => {
                    warn!(source = %source.name(), error = %e, "Skipping unreadable rule source");
                }
            }
        }

        RuleSet::from_rules(raw.iter().map(RouteRule::normalize))
    }
}
