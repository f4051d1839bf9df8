//! Configuration types for routeguard
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Route rule source settings
    pub rules: RulesConfig,

    /// Caller identity resolution settings
    pub identity: IdentityConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rules: RulesConfig::default(),
            identity: IdentityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Server name reported in logs
    pub name: String,

    /// Server version reported in logs
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: crate::server::DEFAULT_PORT,
            name: "routeguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Route rule source configuration
///
/// Rule sources are TOML documents carrying a `[[rules]]` array. They are an
/// explicit list here so tests and embedders can inject their own set; when
/// the list is empty, well-known default paths are probed instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Paths of rule documents, loaded in order
    pub sources: Vec<String>,
}

/// Caller identity resolution configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// How request identity is resolved
    pub mode: IdentityMode,

    /// Header carrying the caller id (mode = "header")
    pub user_header: String,

    /// Header carrying the caller's comma-separated labels (mode = "header")
    pub labels_header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            mode: IdentityMode::None,
            user_header: "x-auth-user".to_string(),
            labels_header: "x-auth-labels".to_string(),
        }
    }
}

/// Identity resolution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Every caller is treated as unauthenticated (default)
    #[default]
    None,
    /// Identity is read from trusted headers set by an upstream auth proxy
    Header,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
