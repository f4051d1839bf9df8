//! Server enforcement middleware integration tests
//!
//! Drives the full axum router through `tower::ServiceExt::oneshot` and
//! asserts on status codes and redirect locations only; denial responses
//! must not leak which rule matched.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use routeguard::access::{AccessResolver, Identity, LabelsMode, RouteRule, RuleSet};
use routeguard::enforce::GuardState;
use routeguard::error::SessionError;
use routeguard::server::router;
use routeguard::session::{RequestIdentityResolver, StaticSession};
use std::sync::Arc;
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

fn guarded(pattern: &str, labels: &[&str], mode: LabelsMode) -> RouteRule {
    RouteRule {
        pattern: pattern.to_string(),
        require_login: true,
        labels: labels.iter().map(|s| s.to_string()).collect(),
        labels_mode: mode,
    }
}

fn default_rules() -> Vec<RouteRule> {
    vec![
        guarded("/admin/**", &["adminx"], LabelsMode::Any),
        guarded("/api/reports/**", &["adminx"], LabelsMode::Any),
        // A rule covering a whitelisted prefix must never fire
        guarded("/login", &["nobody-has-this"], LabelsMode::All),
    ]
}

fn app_with_identity(rules: Vec<RouteRule>, identity: Option<Identity>) -> axum::Router {
    let resolver = Arc::new(AccessResolver::from_rule_set(RuleSet::from_rules(rules)));
    let identities = Arc::new(StaticSession::new(identity));
    router(GuardState::new(resolver, identities))
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn get_json(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
}

/// An identity resolver whose backend is down
struct BrokenResolver;

#[async_trait]
impl RequestIdentityResolver for BrokenResolver {
    async fn identify(&self, _headers: &HeaderMap) -> Result<Option<Identity>, SessionError> {
        Err(SessionError::Failed("identity backend unreachable".to_string()))
    }

    fn resolver_type(&self) -> &'static str {
        "broken"
    }
}

// =============================================================================
// Page Navigations
// =============================================================================

#[tokio::test]
async fn test_anonymous_protected_page_redirects_to_login() {
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get("/admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirect=%2Fadmin");
}

#[tokio::test]
async fn test_redirect_carries_full_intended_path() {
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get("/admin/users/42")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirect=%2Fadmin%2Fusers%2F42");
}

#[tokio::test]
async fn test_wrong_labels_page_redirects_to_unauthorized() {
    let app = app_with_identity(default_rules(), Some(Identity::with_labels(["user"])));
    let response = app.oneshot(get("/admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/unauthorized");
}

#[tokio::test]
async fn test_matching_labels_pass_through() {
    let app = app_with_identity(default_rules(), Some(Identity::with_labels(["adminx"])));
    let response = app.oneshot(get("/admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unruled_path_is_public() {
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get("/pricing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// API Requests
// =============================================================================

#[tokio::test]
async fn test_anonymous_api_request_gets_401() {
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get("/api/reports/q3")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn test_wrong_labels_api_request_gets_403() {
    let app = app_with_identity(default_rules(), Some(Identity::with_labels(["user"])));
    let response = app.oneshot(get("/api/reports/q3")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_json_accept_header_counts_as_api_request() {
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get_json("/admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Whitelist
// =============================================================================

#[tokio::test]
async fn test_whitelisted_page_bypasses_even_a_denying_rule() {
    // default_rules() contains a rule that would deny /login to everyone;
    // the whitelist must win without consulting the facade.
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get("/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_api_prefix_is_whitelisted() {
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get("/api/auth/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unauthorized_page_is_reachable_while_denied() {
    let app = app_with_identity(default_rules(), None);
    let response = app.oneshot(get("/unauthorized")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::LOCATION).is_none());
}

// =============================================================================
// Fail-Open
// =============================================================================

#[tokio::test]
async fn test_broken_identity_resolver_fails_open() {
    let resolver = Arc::new(AccessResolver::from_rule_set(RuleSet::from_rules(
        default_rules(),
    )));
    let app = router(GuardState::new(resolver, Arc::new(BrokenResolver)));

    let response = app.oneshot(get("/admin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
