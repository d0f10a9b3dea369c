//! Unified error types for the jojo workspace.
//!
//! Resolvers, build backends, and the buildfile loader all report through
//! [`JojoError`]. The CLI converts any error reaching `main` into a logged
//! diagnostic and a non-zero exit status.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum JojoError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid or missing.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The `type` discriminant of a version source matches no resolver.
    #[error("unknown version source kind: {kind}")]
    UnknownSourceKind {
        /// The discriminant that was looked up.
        kind: String,
    },

    /// The requested build backend is not registered.
    #[error("unknown build backend: {name}")]
    UnknownBackend {
        /// The backend name that was looked up.
        name: String,
    },

    /// An image reference string could not be split into its parts.
    #[error("malformed image reference: {reference}")]
    InvalidImageReference {
        /// The offending reference.
        reference: String,
    },

    /// An HTTP request failed at the transport level or returned an error status.
    #[error("request to {url} failed: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Transport error or status description.
        message: String,
    },

    /// A package index archive is unreadable or lacks its index member.
    #[error("invalid package index archive: {message}")]
    IndexArchive {
        /// Description of what went wrong while reading the archive.
        message: String,
    },

    /// The release API answered with an explicit error list.
    #[error("release query rejected: {}", errors.join("; "))]
    ReleaseQuery {
        /// Every error message reported in the payload.
        errors: Vec<String>,
    },

    /// An external command exited unsuccessfully.
    #[error("command `{command}` failed: {status}")]
    CommandFailed {
        /// The command line that was executed.
        command: String,
        /// Exit status description.
        status: String,
    },

    /// YAML serialization or deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {source}")]
    Json {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

impl JojoError {
    /// Builds an [`JojoError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, JojoError>;
