//! Error handling for postkit
//!
//! Provides error types for every stage of an export:
//! - G-Code errors (document shape problems found while emitting)
//! - Configuration errors (argument strings and config files)
//! - Collaborator errors (editor/upload plumbing)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code emission error type
///
/// Raised while turning a toolpath document into program text. Any of these
/// aborts the whole export; no partial program is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A document member carries no motion-command tree
    #[error("The object {label} is not a path. Please select only paths and compounds.")]
    InvalidOperationMember {
        /// Label of the offending member.
        label: String,
    },

    /// One or more active tool controllers have zero feeds or speeds
    #[error("Tool controllers with missing feeds/speeds: {}", format_missing(.operations))]
    MissingFeedsSpeeds {
        /// Operation label paired with the names of the missing values.
        operations: Vec<(String, Vec<&'static str>)>,
    },
}

fn format_missing(operations: &[(String, Vec<&'static str>)]) -> String {
    operations
        .iter()
        .map(|(label, missing)| format!("{} ({})", label, missing.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration error type
///
/// An unparseable configuration is never replaced by defaults: the export is
/// aborted and this error is returned to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The argument string or config file could not be parsed
    #[error("Configuration parse error: {reason}")]
    Parse {
        /// The reason parsing failed.
        reason: String,
    },

    /// A value parsed but is outside what the post-processor supports
    #[error("Invalid setting '{key}': {reason}")]
    InvalidValue {
        /// The setting name.
        key: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The config file format is not supported
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// External collaborator error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// The editor process could not be run
    #[error("Editor failed: {reason}")]
    Editor {
        /// The reason the editor failed.
        reason: String,
    },

    /// The destination list could not be obtained
    #[error("Could not list destinations: {reason}")]
    Destinations {
        /// The reason listing failed.
        reason: String,
    },

    /// Upload was refused by the destination
    #[error("Upload to {destination} failed: {reason}")]
    Upload {
        /// The destination identifier.
        destination: String,
        /// The diagnostic returned by the uploader.
        reason: String,
    },
}

/// Main error type for postkit
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Collaborator error
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document error
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
