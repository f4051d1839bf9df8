//! Route access control with dual enforcement
//!
//! A declarative rule engine deciding, for any request path, whether the
//! caller must be authenticated and which authorization labels they must
//! hold, plus the two enforcement points that consult it.
//!
//! ## Features
//!
//! - **Glob route rules**: `*` matches one path segment, `**` any number;
//!   a trailing `/**` also protects the section root itself
//! - **Specificity tie-break**: the matching rule with the most literal
//!   characters wins, so `/admin/secure/**` overrides `/admin/**`
//! - **Label authorization** with `any`/`all` semantics
//! - **Dual enforcement**: a client navigation guard and an axum request
//!   middleware share one facade and always agree
//! - **Lenient rule loading**: malformed sources degrade instead of
//!   failing; unmatched paths are public by default
//!
//! ## Decision Model
//!
//! ```text
//! rule sources → rule set (dedup, compile) → most specific match
//!     → require_login? → labels (any/all) → allow | deny(reason)
//! ```
//!
//! Authentication is checked strictly before labels: an unauthenticated
//! caller is redirected to login, never to the forbidden page.
//!
//! ## Example Rule Document
//!
//! ```toml
//! [[rules]]
//! pattern = "/admin/**"
//! require_login = true
//! labels = ["adminx"]
//!
//! [[rules]]
//! pattern = "/admin/secure/**"
//! require_login = true
//! labels = ["admin", "staff"]
//! labels_mode = "all"
//! ```

pub mod access;
pub mod config;
pub mod enforce;
pub mod error;
pub mod server;
pub mod session;
pub mod util;

// Re-export main types
pub use access::{AccessDecision, AccessReason, AccessResolver, Identity, RouteRule, RuleStore};
pub use config::{AppConfig, load_config};
pub use enforce::{GuardState, NavigationGuard, NavigationOutcome};
pub use error::{AppError, Result};
