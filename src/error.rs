//! Error types for repocache
//!
//! All modules use `RepoCacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repocache operations
pub type RepoCacheResult<T> = Result<T, RepoCacheError>;

/// All errors that can occur in repocache
#[derive(Error, Debug)]
pub enum RepoCacheError {
    // Key derivation errors
    #[error("Invalid repository identity {input:?}: {reason}")]
    InvalidIdentity { input: String, reason: String },

    #[error("Invalid cache namespace {namespace:?}: {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    // Cache errors
    #[error("Archive cache transport error for {namespace}: {reason}")]
    CacheTransport { namespace: String, reason: String },

    #[error("Cached copy of {} could not be found", .projects.join(", "))]
    CacheMissWithoutForce { projects: Vec<String> },

    #[error("Failed to extract archive {path}: {reason}")]
    ArchiveExtract { path: PathBuf, reason: String },

    // VCS errors
    #[error("Checkout failed: {command}: {stderr}")]
    Checkout { command: String, stderr: String },

    #[error("Manifest operation failed: {command}: {stderr}")]
    Manifest { command: String, stderr: String },

    #[error("Checkout ran but did not generate {0}")]
    StructuralOutputMissing(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepoCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a checkout error from a failed VCS command
    pub fn checkout(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Checkout {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a transport error for a cache namespace
    pub fn transport(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CacheTransport {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable by a caller-level policy
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CacheTransport { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheMissWithoutForce { .. } => {
                Some("Use '--force-clone' to perform a full clone")
            }
            Self::CacheTransport { .. } => {
                Some("Check connectivity to the artifact index, then retry")
            }
            Self::StructuralOutputMissing(_) => {
                Some("The sync tool exited successfully without producing output; inspect its logs")
            }
            _ => None,
        }
    }
}
