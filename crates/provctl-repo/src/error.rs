//! Error types for provider repository operations

use std::path::PathBuf;

use provctl_core::CoreError;
use provctl_engine::EngineError;
use thiserror::Error;

/// Repository operation errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Caller Errors ============
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    // ============ Provider URL Errors ============
    #[error("Invalid provider url {url}: scheme '{scheme}' is not supported")]
    UnsupportedScheme { scheme: String, url: String },

    #[error("Invalid provider url {url}: {reason}")]
    MalformedProviderUrl { url: String, reason: String },

    // ============ Fetch Errors ============
    #[error("{resource} not found for provider {provider} version {version}")]
    NotFound {
        provider: String,
        version: String,
        resource: String,
    },

    #[error("Remote error for provider {provider} version {version} ({path}): {message}")]
    Remote {
        provider: String,
        version: String,
        path: String,
        message: String,
    },

    #[error("Invalid version {version} for provider {provider}: {reason}")]
    InvalidVersion {
        provider: String,
        version: String,
        reason: String,
    },

    #[error("No versions available for provider {provider}")]
    NoVersionsAvailable { provider: String },

    // ============ Processing Errors ============
    #[error("Failed to render {path} for provider {provider} version {version}: {source}")]
    Render {
        provider: String,
        version: String,
        path: String,
        #[source]
        source: EngineError,
    },

    #[error("Invalid metadata for provider {provider} version {version}: {message}")]
    InvalidMetadata {
        provider: String,
        version: String,
        message: String,
    },

    // ============ IO Errors ============
    #[error("Failed to read override {}: {source}", .path.display())]
    Override {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RepoError {
    /// Whether the error means the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }

    pub(crate) fn remote(
        provider: &str,
        version: &str,
        path: &str,
        message: impl Into<String>,
    ) -> Self {
        RepoError::Remote {
            provider: provider.to_string(),
            version: version.to_string(),
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(provider: &str, version: &str, resource: impl Into<String>) -> Self {
        RepoError::NotFound {
            provider: provider.to_string(),
            version: version.to_string(),
            resource: resource.into(),
        }
    }
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;
