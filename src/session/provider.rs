//! Identity resolution providers
//!
//! The identity provider itself (accounts, sessions, credentials) is an
//! external service; these traits are the seams through which the
//! enforcement points obtain the caller's identity from it.

use crate::access::Identity;
use crate::config::{IdentityConfig, IdentityMode};
use crate::error::SessionError;
// async_trait required for dyn-compatibility with Box<dyn ...>
use async_trait::async_trait;
use axum::http::HeaderMap;

/// Client-side session resolution
///
/// Called by the navigation guard before every navigation to freshly
/// resolve the caller's session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the current caller identity, if any
    async fn current_identity(&self) -> Result<Option<Identity>, SessionError>;
}

/// Box type alias for session providers
pub type BoxedSessionProvider = Box<dyn SessionProvider>;

/// Server-side per-request identity resolution
#[async_trait]
pub trait RequestIdentityResolver: Send + Sync {
    /// Resolve the caller identity from request headers, if any
    async fn identify(&self, headers: &HeaderMap) -> Result<Option<Identity>, SessionError>;

    /// Description of the resolution method (for logging)
    fn resolver_type(&self) -> &'static str;
}

/// Box type alias for request identity resolvers
pub type BoxedIdentityResolver = Box<dyn RequestIdentityResolver>;

/// Treats every caller as unauthenticated
pub struct NoIdentity;

#[async_trait]
impl RequestIdentityResolver for NoIdentity {
    async fn identify(&self, _headers: &HeaderMap) -> Result<Option<Identity>, SessionError> {
        Ok(None)
    }

    fn resolver_type(&self) -> &'static str {
        "none"
    }
}

/// Trusts identity headers set by an upstream authentication proxy
///
/// The user header carries the caller id (an address doubles as the email);
/// the labels header carries a comma-separated label list.
pub struct HeaderIdentity {
    user_header: String,
    labels_header: String,
}

impl HeaderIdentity {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            user_header: config.user_header.clone(),
            labels_header: config.labels_header.clone(),
        }
    }
}

#[async_trait]
impl RequestIdentityResolver for HeaderIdentity {
    async fn identify(&self, headers: &HeaderMap) -> Result<Option<Identity>, SessionError> {
        let Some(user) = headers.get(&self.user_header) else {
            return Ok(None);
        };
        let user = user
            .to_str()
            .map_err(|e| SessionError::Malformed(e.to_string()))?
            .trim();
        if user.is_empty() {
            return Ok(None);
        }

        let labels = match headers.get(&self.labels_header) {
            Some(value) => value
                .to_str()
                .map_err(|e| SessionError::Malformed(e.to_string()))?
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        Ok(Some(Identity {
            id: Some(user.to_string()),
            email: user.contains('@').then(|| user.to_string()),
            labels,
        }))
    }

    fn resolver_type(&self) -> &'static str {
        "header"
    }
}

/// Fixed identity, for tests and local development
#[derive(Default)]
pub struct StaticSession {
    identity: Option<Identity>,
}

impl StaticSession {
    pub fn new(identity: Option<Identity>) -> Self {
        Self { identity }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_identity(&self) -> Result<Option<Identity>, SessionError> {
        Ok(self.identity.clone())
    }
}

#[async_trait]
impl RequestIdentityResolver for StaticSession {
    async fn identify(&self, _headers: &HeaderMap) -> Result<Option<Identity>, SessionError> {
        Ok(self.identity.clone())
    }

    fn resolver_type(&self) -> &'static str {
        "static"
    }
}

/// Create a request identity resolver from configuration
pub fn create_identity_resolver(config: &IdentityConfig) -> BoxedIdentityResolver {
    match config.mode {
        IdentityMode::None => Box::new(NoIdentity),
        IdentityMode::Header => Box::new(HeaderIdentity::new(config)),
    }
}
