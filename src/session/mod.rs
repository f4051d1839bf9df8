//! Session and identity resolution
//!
//! The enforcement points never talk to the identity service directly; they
//! go through the provider traits defined here, so the external service can
//! be swapped or faked in tests.

pub mod provider;

pub use provider::{
    BoxedIdentityResolver, BoxedSessionProvider, HeaderIdentity, NoIdentity,
    RequestIdentityResolver, SessionProvider, StaticSession, create_identity_resolver,
};
