//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (ROUTEGUARD_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::{AppConfig, IdentityMode};
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "routeguard.toml",
    ".routeguard.toml",
    "~/.config/routeguard/config.toml",
    "/etc/routeguard/config.toml",
];

/// Recognized log levels for validation
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with ROUTEGUARD_ prefix
    // e.g., ROUTEGUARD_SERVER__PORT, ROUTEGUARD_IDENTITY__MODE
    // Double underscore (__) maps to nested keys (server.port)
    builder = builder.add_source(
        Environment::with_prefix("ROUTEGUARD")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // Build and deserialize
    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // Validate port
    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    // Validate log level
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::Invalid {
            message: format!(
                "logging.level must be one of {:?}, got: {}",
                LOG_LEVELS, config.logging.level
            ),
        });
    }

    // Validate identity headers when header mode is selected
    if config.identity.mode == IdentityMode::Header {
        if config.identity.user_header.is_empty() {
            return Err(ConfigError::Missing {
                field: "identity.user_header".to_string(),
            });
        }
        if config.identity.labels_header.is_empty() {
            return Err(ConfigError::Missing {
                field: "identity.labels_header".to_string(),
            });
        }
    }

    // Rule source paths must not be empty strings
    for path in &config.rules.sources {
        if path.is_empty() {
            return Err(ConfigError::Invalid {
                message: "rules.sources entries must be non-empty paths".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::LogFormat;

    #[test]
    fn test_load_config_from_str_basic() {
        let toml = r#"
[server]
name = "test-server"
port = 9000

[logging]
level = "debug"
format = "json"
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.name, "test-server");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_config_from_str_rule_sources() {
        let toml = r#"
[rules]
sources = ["routes.toml", "extra-routes.toml"]
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.rules.sources, vec!["routes.toml", "extra-routes.toml"]);
    }

    #[test]
    fn test_load_config_from_str_identity_header() {
        let toml = r#"
[identity]
mode = "header"
user_header = "x-user"
labels_header = "x-labels"
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.identity.mode, IdentityMode::Header);
        assert_eq!(config.identity.user_header, "x-user");
    }

    #[test]
    fn test_zero_port_error() {
        let toml = r#"
[server]
port = 0
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_unknown_log_level_error() {
        let toml = r#"
[logging]
level = "verbose"
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_empty_identity_header_error() {
        let toml = r#"
[identity]
mode = "header"
user_header = ""
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_explicit_missing_config_path_error() {
        let result = load_config(Some("/nonexistent/routeguard.toml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
