//! Error types for excel-mcp.
//!
//! Two families live here: [`ConfigError`] for configuration loading and
//! [`WorkbookError`] for everything a tool handler can fail with. Workbook
//! errors are translated to JSON-RPC error responses at the dispatcher
//! boundary; none of them are fatal to the server process.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Result type for workbook operations.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Errors that can occur while executing a workbook tool.
///
/// The taxonomy matches what the dispatcher reports to clients: malformed
/// input (`InvalidArgument`, `InvalidAddress`), missing targets
/// (`FileNotFound`, `SheetNotFound`), duplicate targets (`SheetExists`) and
/// I/O failures at the file-system boundary.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// A caller-supplied argument is malformed (bad path shape, empty sheet
    /// name, empty range payload).
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of what's wrong.
        message: String,
    },

    /// An A1-style cell or range token does not match the grammar.
    #[error("invalid address '{token}': expected a reference like {example}")]
    InvalidAddress {
        /// The offending token.
        token: String,
        /// A well-formed example shown to the caller.
        example: &'static str,
    },

    /// The workbook file does not exist or cannot be parsed.
    #[error("workbook not found: {path}")]
    FileNotFound {
        /// Path to the workbook.
        path: PathBuf,
    },

    /// No worksheet of the requested name exists in the workbook.
    #[error("worksheet '{name}' not found. Available sheets: {available}")]
    SheetNotFound {
        /// The requested sheet name.
        name: String,
        /// Comma-joined list of sheet names present in the workbook.
        available: String,
    },

    /// A worksheet of the requested name already exists.
    #[error("worksheet '{name}' already exists")]
    SheetExists {
        /// The duplicate sheet name.
        name: String,
    },

    /// The codec failed to write the workbook (permissions, disk, lock).
    #[error("failed to write file {path}: {detail}")]
    FileWrite {
        /// Path being written.
        path: PathBuf,
        /// Codec error description.
        detail: String,
    },
}

impl WorkbookError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid address error for a cell token.
    pub fn invalid_cell(token: impl Into<String>) -> Self {
        Self::InvalidAddress {
            token: token.into(),
            example: "A1, B2 or AA10",
        }
    }

    /// Creates an invalid address error for a range token.
    pub fn invalid_range(token: impl Into<String>) -> Self {
        Self::InvalidAddress {
            token: token.into(),
            example: "A1:C3 or B2:D10",
        }
    }

    /// Creates a sheet-not-found error embedding the available sheet names.
    pub fn sheet_not_found(name: impl Into<String>, available: impl Into<String>) -> Self {
        Self::SheetNotFound {
            name: name.into(),
            available: available.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn invalid_cell_echoes_token_and_example() {
        let error = WorkbookError::invalid_cell("a1");
        let msg = error.to_string();
        assert!(msg.contains("'a1'"));
        assert!(msg.contains("A1"));
    }

    #[test]
    fn sheet_not_found_lists_available() {
        let error = WorkbookError::sheet_not_found("Missing", "Sheet1, Data");
        let msg = error.to_string();
        assert!(msg.contains("'Missing'"));
        assert!(msg.contains("Sheet1, Data"));
    }
}
