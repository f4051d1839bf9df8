//! Client-side navigation guard
//!
//! Intercepts client navigations before they commit. The host router calls
//! [`NavigationGuard::before_navigate`] with the target path and applies the
//! returned outcome; registration is explicit and happens exactly once per
//! application instance.
//!
//! Per navigation the guard walks: resolve session, check access, map the
//! decision to an outcome. A session-resolution failure demotes the caller
//! to unauthenticated rather than aborting the navigation, and an internal
//! panic in the access check fails open so a rule-engine bug cannot brick
//! navigation entirely.

use crate::access::{AccessReason, AccessResolver};
use crate::error::GuardError;
use crate::session::SessionProvider;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, error, warn};

/// Login page navigations are redirected to on `not_authenticated`
pub const LOGIN_PATH: &str = "/login";

/// Page navigations are redirected to on `missing_labels`
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Build the login redirect target carrying the originally intended path
pub fn login_redirect(intended: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", urlencoding::encode(intended))
}

/// Outcome of a pre-navigation access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Navigation may proceed unmodified
    Proceed,
    /// Redirect to the login page, carrying the intended path
    RedirectLogin { target: String },
    /// Redirect to the unauthorized page
    RedirectUnauthorized,
    /// A newer navigation started while this check was in flight; the
    /// caller must discard this result
    Superseded,
}

/// Navigation guard enforcing route access on the client
pub struct NavigationGuard {
    resolver: Arc<AccessResolver>,
    sessions: Arc<dyn SessionProvider>,
    /// Monotonic navigation counter; stale checks compare against it
    epoch: AtomicU64,
    registered: AtomicBool,
}

impl NavigationGuard {
    pub fn new(resolver: Arc<AccessResolver>, sessions: Arc<dyn SessionProvider>) -> Arc<Self> {
        Arc::new(Self {
            resolver,
            sessions,
            epoch: AtomicU64::new(0),
            registered: AtomicBool::new(false),
        })
    }

    /// Register this guard for enforcement.
    ///
    /// Callable exactly once per guard; a second registration fails rather
    /// than double-enforcing. Dropping the returned handle unregisters the
    /// guard, after which it can be registered again.
    pub fn register(self: &Arc<Self>) -> Result<GuardHandle, GuardError> {
        if self.registered.swap(true, Ordering::SeqCst) {
            return Err(GuardError::AlreadyRegistered);
        }
        debug!("Navigation guard registered");
        Ok(GuardHandle {
            guard: Arc::clone(self),
        })
    }

    /// Run the access check for a navigation to `target`.
    ///
    /// An unregistered (or disposed) guard lets every navigation proceed.
    pub async fn before_navigate(&self, target: &str) -> NavigationOutcome {
        if !self.registered.load(Ordering::SeqCst) {
            return NavigationOutcome::Proceed;
        }

        let ticket = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        // Resolve the session freshly for every navigation; a failure here
        // means "no identity", not an aborted navigation.
        let identity = match self.sessions.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Session resolution failed, treating caller as unauthenticated");
                None
            }
        };

        // A newer navigation superseded this one while the session check
        // was in flight; its result must not be applied.
        if self.epoch.load(Ordering::SeqCst) != ticket {
            debug!(target, "Navigation check superseded");
            return NavigationOutcome::Superseded;
        }

        let decision = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.resolver.check_path(target, identity.as_ref())
        })) {
            Ok(decision) => decision,
            Err(_) => {
                // Fail-open: a bug in the rule engine must not block the app
                error!(target, "Access check panicked, allowing navigation");
                return NavigationOutcome::Proceed;
            }
        };

        match decision.reason {
            AccessReason::Ok => NavigationOutcome::Proceed,
            AccessReason::NotAuthenticated => NavigationOutcome::RedirectLogin {
                target: login_redirect(target),
            },
            AccessReason::MissingLabels => NavigationOutcome::RedirectUnauthorized,
        }
    }
}

/// Disposer returned by [`NavigationGuard::register`]
///
/// Dropping it unregisters the guard.
pub struct GuardHandle {
    guard: Arc<NavigationGuard>,
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.guard.registered.store(false, Ordering::SeqCst);
        debug!("Navigation guard unregistered");
    }
}
