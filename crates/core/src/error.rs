//! Error types for mcmm operations.
//!
//! Two families live here:
//!
//! - [`Error`] - configuration and filesystem failures that abort a whole
//!   command (missing profile, malformed record, unwritable mods folder).
//! - [`ProviderError`] - per-entry failures reported by mod providers. These are
//!   values, collected by the sync engine, never a reason to abort a batch.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::providers::CapabilityKind;

/// Result type alias for mcmm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mcmm operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The persisted definition for a profile does not exist.
    #[error("Could not find a profile named '{name}'")]
    #[diagnostic(
        code(mcmm::profile::not_found),
        help("Run 'mcmm list' to see available profiles or 'mcmm generate {name}' to create it")
    )]
    ProfileNotFound {
        /// Profile name as requested.
        name: String,
        /// Where the profile record was expected.
        path: PathBuf,
    },

    /// The persisted profile record could not be parsed.
    #[error("Profile '{name}' is malformed: {message}")]
    #[diagnostic(code(mcmm::profile::malformed))]
    MalformedProfile {
        /// Profile name.
        name: String,
        /// Parser message.
        message: String,
    },

    /// The profile name cannot be used as a file name.
    #[error("Invalid profile name '{0}'")]
    #[diagnostic(
        code(mcmm::profile::invalid_name),
        help("Profile names must be non-empty and must not contain path separators")
    )]
    InvalidProfileName(String),

    /// The Minecraft installation to (de)activate into does not exist.
    #[error("Minecraft folder {} does not exist", path.display())]
    #[diagnostic(
        code(mcmm::install::not_found),
        help("Set 'minecraft_folder' in the profile, or MCMM_MINECRAFT_DIR for the default installation")
    )]
    InstallationNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// Invalid or unresolvable configuration.
    #[error("Configuration error: {0}")]
    #[diagnostic(code(mcmm::config))]
    Configuration(String),

    /// A filesystem operation failed.
    #[error("I/O operation '{operation}' failed for {}", path.display())]
    #[diagnostic(
        code(mcmm::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// What was being attempted (e.g. "remove", "copy").
        operation: &'static str,
        /// The path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a profile-not-found error.
    #[must_use]
    pub fn profile_not_found(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::ProfileNotFound {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a malformed-profile error.
    #[must_use]
    pub fn malformed_profile(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedProfile {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the operation and path that produced it.
    #[must_use]
    pub fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure reported by (or on behalf of) a mod provider.
///
/// The `Display` output of every variant is non-empty; it is what the CLI shows
/// next to the failing profile entry.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No provider with this id is registered.
    #[error("Could not locate mod provider with id '{0}'")]
    NotFound(String),

    /// The provider exists but does not offer the requested capability.
    #[error("Mod provider '{id}' does not provide a {kind} handler")]
    CapabilityNotOffered {
        /// Provider id.
        id: String,
        /// Requested capability.
        kind: CapabilityKind,
    },

    /// Entry metadata does not match what the provider expects.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// The remote source has nothing matching the entry's constraints.
    #[error("No matching artifact: {0}")]
    NoMatchingArtifact(String),

    /// The remote answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// Local filesystem failure inside the provider.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Interactive input failed during generation.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Anything else the provider wants to report.
    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    /// Create an invalid-metadata error.
    #[must_use]
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a no-matching-artifact error.
    #[must_use]
    pub fn no_matching_artifact(msg: impl Into<String>) -> Self {
        Self::NoMatchingArtifact(msg.into())
    }

    /// Create a network error.
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a generic provider failure.
    #[must_use]
    pub fn failed(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.is_empty() {
            Self::Failed("unspecified provider failure".to_string())
        } else {
            Self::Failed(msg)
        }
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
        }
    }
}
