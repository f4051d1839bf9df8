//! Enforcement points
//!
//! Two call sites consult the access decision facade and must agree on its
//! verdicts: the client navigation guard and the server request middleware.
//! Both fail open on internal errors, so an engine bug degrades to public
//! routing rather than an outage, and both keep denial responses generic.

pub mod client;
pub mod server;

pub use client::{
    GuardHandle, LOGIN_PATH, NavigationGuard, NavigationOutcome, UNAUTHORIZED_PATH, login_redirect,
};
pub use server::{GuardState, PUBLIC_PREFIXES, enforce, is_public};
