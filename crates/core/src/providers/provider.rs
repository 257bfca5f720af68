//! The capability contract every mod provider satisfies.
//!
//! A provider is any type implementing [`Provider`]. It advertises a
//! capability by implementing the matching capability trait and returning
//! `Some(self)` from the corresponding accessor:
//!
//! ```ignore
//! use mcmm_core::providers::{DownloadCapability, DownloadRequest, Provider};
//!
//! #[derive(Default)]
//! pub struct LocalProvider;
//!
//! impl Provider for LocalProvider {
//!     fn id(&self) -> &str { "local" }
//!     fn as_download(&self) -> Option<&dyn DownloadCapability> { Some(self) }
//! }
//!
//! #[async_trait]
//! impl DownloadCapability for LocalProvider {
//!     async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
//!         // ...
//!     }
//! }
//! ```
//!
//! Accessors left at their default are invisible to the registry.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ProviderError;
use crate::prompt::Prompt;

/// Provider-specific entry data, stored verbatim in a profile.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Deserialize entry metadata into a provider's own typed representation.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidMetadata`] if the mapping does not match `T`.
pub fn metadata_as<T: DeserializeOwned>(metadata: &Metadata) -> Result<T, ProviderError> {
    serde_json::from_value(serde_json::Value::Object(metadata.clone()))
        .map_err(|e| ProviderError::invalid_metadata(e.to_string()))
}

/// Serialize a provider's typed metadata back into an opaque mapping.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidMetadata`] if `value` does not serialize to a
/// JSON object.
pub fn metadata_from<T: Serialize>(value: &T) -> Result<Metadata, ProviderError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProviderError::invalid_metadata(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(ProviderError::invalid_metadata(e.to_string())),
    }
}

/// Kinds of handlers a provider can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum CapabilityKind {
    /// Fetch an artifact for a profile entry.
    Download,
    /// Interactively build the metadata for a new profile entry.
    Generate,
}

impl CapabilityKind {
    /// Every known kind, in display order.
    pub const ALL: [Self; 2] = [Self::Download, Self::Generate];

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Generate => "generate",
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CapabilityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "download" => Ok(Self::Download),
            "generate" => Ok(Self::Generate),
            _ => Err(format!("Unknown capability kind: {s}")),
        }
    }
}

/// Parameters handed to a download handler.
pub struct DownloadRequest<'a> {
    /// Target Minecraft version (profile value or command-line override).
    pub minecraft_version: &'a str,
    /// The entry's metadata, as stored in the profile.
    pub metadata: &'a Metadata,
    /// Provider-scoped scratch directory. Already exists when the handler runs.
    pub cache_dir: &'a Path,
}

/// Base trait for all mod providers.
///
/// Providers must be `Send + Sync` so the runner can hold them behind an `Arc`
/// across await points.
pub trait Provider: Send + Sync + 'static {
    /// Unique, non-empty identifier. Profiles reference providers by this id.
    fn id(&self) -> &str;

    /// Human-readable label for listings.
    fn label(&self) -> Option<&str> {
        None
    }

    /// The download handler, if this provider offers one.
    fn as_download(&self) -> Option<&dyn DownloadCapability> {
        None
    }

    /// The generation handler, if this provider offers one.
    fn as_generate(&self) -> Option<&dyn GenerateCapability> {
        None
    }
}

impl dyn Provider {
    /// Capability kinds this provider offers, in [`CapabilityKind::ALL`] order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|kind| self.offers(*kind))
            .collect()
    }

    /// Whether this provider offers `kind`.
    #[must_use]
    pub fn offers(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Download => self.as_download().is_some(),
            CapabilityKind::Generate => self.as_generate().is_some(),
        }
    }
}

/// Capability for producing an artifact for one profile entry.
///
/// Ordinary negative outcomes (HTTP error status, nothing matching the
/// metadata) must come back as `Err(ProviderError)`, never as a panic. File
/// names should be derived from the inputs so a second download of the same
/// entry overwrites the first.
#[async_trait]
pub trait DownloadCapability: Send + Sync {
    /// Produce the artifact and return its path.
    async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError>;
}

/// Capability for interactively creating a profile entry.
pub trait GenerateCapability: Send + Sync {
    /// Ask the user whatever is needed and return the entry metadata.
    fn generate(&self, prompt: &mut dyn Prompt) -> Result<Metadata, ProviderError>;
}
