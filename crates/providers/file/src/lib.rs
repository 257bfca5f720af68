//! Local file mod provider for mcmm.
//!
//! For jars that are not published anywhere mcmm can reach: the profile entry
//! points at a file on disk, which is copied into the provider cache.
//!
//! Metadata: `{"file_path": "/path/to/mod.jar"}`

use std::path::PathBuf;

use async_trait::async_trait;
use mcmm_core::ProviderError;
use mcmm_core::prompt::Prompt;
use mcmm_core::providers::{
    DownloadCapability, DownloadRequest, GenerateCapability, Metadata, Provider, ProviderSource,
    metadata_as, metadata_from,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Provider id used in profiles.
pub const ID: &str = "file";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct FileMetadata {
    file_path: PathBuf,
}

/// Copies a local jar into the cache.
#[derive(Debug, Default)]
pub struct FileModProvider;

impl FileModProvider {
    /// Create a new file provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Provider for FileModProvider {
    fn id(&self) -> &str {
        ID
    }

    fn label(&self) -> Option<&str> {
        Some("Local File Mod Provider")
    }

    fn as_download(&self) -> Option<&dyn DownloadCapability> {
        Some(self)
    }

    fn as_generate(&self) -> Option<&dyn GenerateCapability> {
        Some(self)
    }
}

#[async_trait]
impl DownloadCapability for FileModProvider {
    async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
        let FileMetadata { file_path } = metadata_as(request.metadata)?;
        let file_name = file_path.file_name().ok_or_else(|| {
            ProviderError::invalid_metadata(format!(
                "'{}' does not name a file",
                file_path.display()
            ))
        })?;
        if !file_path.is_file() {
            return Err(ProviderError::no_matching_artifact(format!(
                "{} does not exist",
                file_path.display()
            )));
        }

        let out_file = request.cache_dir.join(file_name);
        debug!(from = %file_path.display(), to = %out_file.display(), "Copying local mod");
        std::fs::copy(&file_path, &out_file)?;
        Ok(out_file)
    }
}

impl GenerateCapability for FileModProvider {
    fn generate(&self, prompt: &mut dyn Prompt) -> Result<Metadata, ProviderError> {
        let file_path = prompt
            .ask("File Path: ")
            .map_err(|e| ProviderError::Prompt(e.to_string()))?;
        metadata_from(&FileMetadata {
            file_path: PathBuf::from(file_path.trim()),
        })
    }
}

/// The source handed to registry discovery.
#[must_use]
pub fn source() -> ProviderSource {
    ProviderSource::new("mcmm-provider-file").with_default::<FileModProvider>()
}
