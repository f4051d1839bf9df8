//! Error types for routeguard
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API.
//!
//! Expected access-control outcomes (not authenticated, missing labels) are
//! deliberately NOT errors; they travel as the `reason` on an
//! [`AccessDecision`](crate::access::AccessDecision).

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Guard error: {0}")]
    Guard(#[from] GuardError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session/identity resolution errors
///
/// Raised by identity collaborators. Both enforcement points catch these at
/// their boundary; they never reach a caller of the facade.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No identity resolution configured")]
    NotConfigured,

    #[error("Malformed identity data: {0}")]
    Malformed(String),

    #[error("Session resolution failed: {0}")]
    Failed(String),
}

/// Navigation guard errors
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Navigation enforcement is already registered for this guard")]
    AlreadyRegistered,
}

/// HTTP server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::from(ConfigError::Missing {
            field: "server.port".to_string(),
        });
        assert!(err.to_string().contains("server.port"));

        let err = GuardError::AlreadyRegistered;
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_invalid_pattern_display() {
        let err = ConfigError::InvalidPattern {
            pattern: "/admin/**".to_string(),
            reason: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/admin/**"));
        assert!(msg.contains("boom"));
    }
}
