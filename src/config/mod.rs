//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk and parsing
//! it into validated, type-safe structures.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path specified via the CLI argument
//! 2. Default location:
//!    - **Linux/macOS:** `~/.excel-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.excel-mcp\config.json`
//!
//! An explicitly named file must exist. The default location is optional:
//! MCP servers are usually spawned by a client process, so a missing default
//! config falls back to built-in defaults instead of failing startup.

mod settings;

pub use settings::{Config, LoggingConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.excel-mcp/`
/// - **Windows:** `%USERPROFILE%\.excel-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".excel-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, the platform default location is used when it
/// exists; otherwise built-in defaults apply.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly named configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - A field fails validation
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_dir_exists() {
        assert!(default_config_dir().is_some());
    }

    #[test]
    fn default_config_path_exists() {
        let path = default_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("config.json"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/config.json")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }
}
