//! Route access-control module
//!
//! Declarative, pattern-based access control for request paths.
//!
//! ## Access Control Model
//!
//! Rules are glob patterns over paths with optional requirements:
//!
//! - `require_login` denies unauthenticated callers outright
//! - `labels` names the authorization labels a caller must hold, evaluated
//!   with `any` (at least one) or `all` (every one) semantics
//!
//! For each path the single most specific matching rule wins: most
//! non-wildcard characters first, then raw pattern length. A path no rule
//! matches is public. Authentication is always checked before labels, so an
//! unauthenticated caller is told to log in rather than shown a forbidden
//! page.
//!
//! ## Example Rule Document
//!
//! ```toml
//! [[rules]]
//! pattern = "/admin/**"           # also covers /admin itself
//! require_login = true
//! labels = ["adminx"]
//!
//! [[rules]]
//! pattern = "/test-protected"     # login required, any labels
//! require_login = true
//!
//! [[rules]]
//! pattern = "/admin/secure/**"    # beats /admin/** below /admin/secure
//! require_login = true
//! labels = ["admin", "staff"]
//! labels_mode = "all"
//! ```

pub mod evaluator;
pub mod patterns;
pub mod resolver;
pub mod store;
pub mod types;

pub use evaluator::evaluate_labels;
pub use patterns::RouteMatcher;
pub use resolver::AccessResolver;
pub use store::{CompiledRule, FileSource, RuleSet, RuleSource, RuleStore, StaticSource};
pub use types::{AccessDecision, AccessReason, Identity, LabelsMode, RouteRule};
