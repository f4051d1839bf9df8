//! Server-side request enforcement
//!
//! An axum middleware that runs the access check once per incoming request,
//! before the response is produced. Whitelisted public prefixes (auth
//! endpoints, static assets, informational pages) bypass the check without
//! consulting the facade at all.
//!
//! Denied API-shaped requests get 401/403 with a generic machine-readable
//! body; denied page navigations get a 302 redirect to the login page (with
//! a return-url) or the unauthorized page. Which rule matched is never
//! exposed. Internal failures (an erroring identity resolver, a panic in
//! the rule engine) fail open and let the request through.

use crate::access::{AccessReason, AccessResolver};
use crate::enforce::client::{UNAUTHORIZED_PATH, login_redirect};
use crate::session::RequestIdentityResolver;
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Path prefixes that bypass access control entirely
pub const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/register",
    "/auth",
    "/unauthorized",
    "/verify-email",
    "/password-reset",
    "/favicon.ico",
    "/_nuxt",
    "/_assets",
    "/api/auth",
];

/// Whether a path is exempt from access control
pub fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Shared state for the enforcement middleware
#[derive(Clone)]
pub struct GuardState {
    pub resolver: Arc<AccessResolver>,
    pub identities: Arc<dyn RequestIdentityResolver>,
}

impl GuardState {
    pub fn new(
        resolver: Arc<AccessResolver>,
        identities: Arc<dyn RequestIdentityResolver>,
    ) -> Self {
        Self {
            resolver,
            identities,
        }
    }
}

/// Heuristic: does this request expect a data response rather than a page?
fn wants_data(path: &str, headers: &HeaderMap) -> bool {
    if path == "/api" || path.starts_with("/api/") {
        return true;
    }
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    accept.contains("application/json") && !accept.contains("text/html")
}

/// Request enforcement middleware
pub async fn enforce(State(state): State<GuardState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    if is_public(&path) {
        trace!(path, "Public prefix, skipping access check");
        return next.run(req).await;
    }

    let data_request = wants_data(&path, req.headers());

    let identity = match state.identities.identify(req.headers()).await {
        Ok(identity) => identity,
        Err(e) => {
            // Fail-open: an identity-resolution outage must not take down
            // all traffic
            error!(path, error = %e, "Identity resolution failed, allowing request");
            return next.run(req).await;
        }
    };

    let decision = match panic::catch_unwind(AssertUnwindSafe(|| {
        state.resolver.check_path(&path, identity.as_ref())
    })) {
        Ok(decision) => decision,
        Err(_) => {
            error!(path, "Access check panicked, allowing request");
            return next.run(req).await;
        }
    };

    if decision.allowed {
        return next.run(req).await;
    }

    debug!(path, reason = %decision.reason, "Request denied");
    deny_response(&path, data_request, decision.reason)
}

/// Build the denial response without leaking rule details
fn deny_response(path: &str, data_request: bool, reason: AccessReason) -> Response {
    if data_request {
        let status = match reason {
            AccessReason::NotAuthenticated => StatusCode::UNAUTHORIZED,
            _ => StatusCode::FORBIDDEN,
        };
        return (status, Json(json!({ "error": reason.as_str() }))).into_response();
    }

    let location = match reason {
        AccessReason::NotAuthenticated => login_redirect(path),
        _ => UNAUTHORIZED_PATH.to_string(),
    };
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
