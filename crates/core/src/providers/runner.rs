//! Dispatch by provider id and capability kind.
//!
//! [`ProviderRunner`] is the only way the rest of mcmm calls into providers.
//! Unknown ids and missing capabilities come back as [`ProviderError`] values;
//! errors produced by the provider itself are passed through untouched.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::provider::{CapabilityKind, DownloadRequest, Metadata};
use super::registry::{ProviderRegistry, RegisteredProvider};
use crate::error::ProviderError;
use crate::prompt::Prompt;

/// Invokes provider handlers held by a [`ProviderRegistry`].
#[derive(Debug)]
pub struct ProviderRunner {
    registry: ProviderRegistry,
    cache_root: PathBuf,
}

impl ProviderRunner {
    /// Wrap a registry. Download handlers get `cache_root/<provider id>` as
    /// their scratch directory.
    #[must_use]
    pub fn new(registry: ProviderRegistry, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            cache_root: cache_root.into(),
        }
    }

    /// Look up `id` and check that it offers `kind`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] if no provider has this id,
    /// [`ProviderError::CapabilityNotOffered`] if it lacks `kind`.
    pub fn resolve(
        &self,
        kind: CapabilityKind,
        id: &str,
    ) -> Result<&RegisteredProvider, ProviderError> {
        let provider = self
            .registry
            .get(id)
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;

        if !provider.offers(kind) {
            return Err(ProviderError::CapabilityNotOffered {
                id: id.to_string(),
                kind,
            });
        }

        Ok(provider)
    }

    /// Run `id`'s download handler.
    ///
    /// # Errors
    ///
    /// Dispatch errors from [`Self::resolve`], failure to create the provider's
    /// cache directory, or whatever the handler reports.
    #[instrument(skip(self, metadata), fields(provider = %id))]
    pub async fn download(
        &self,
        id: &str,
        minecraft_version: &str,
        metadata: &Metadata,
    ) -> Result<PathBuf, ProviderError> {
        let provider = self.resolve(CapabilityKind::Download, id)?;
        let handler = provider
            .instance()
            .as_download()
            .ok_or_else(|| ProviderError::CapabilityNotOffered {
                id: id.to_string(),
                kind: CapabilityKind::Download,
            })?;

        let cache_dir = self.provider_cache_dir(id);
        std::fs::create_dir_all(&cache_dir)?;

        debug!(cache_dir = %cache_dir.display(), "Invoking download handler");
        handler
            .download(&DownloadRequest {
                minecraft_version,
                metadata,
                cache_dir: &cache_dir,
            })
            .await
    }

    /// Run `id`'s generation handler.
    ///
    /// # Errors
    ///
    /// Dispatch errors from [`Self::resolve`] or whatever the handler reports.
    pub fn generate(&self, id: &str, prompt: &mut dyn Prompt) -> Result<Metadata, ProviderError> {
        let provider = self.resolve(CapabilityKind::Generate, id)?;
        let handler = provider
            .instance()
            .as_generate()
            .ok_or_else(|| ProviderError::CapabilityNotOffered {
                id: id.to_string(),
                kind: CapabilityKind::Generate,
            })?;

        debug!(provider = %id, "Invoking generate handler");
        handler.generate(prompt)
    }

    /// Ids of providers offering `kind`, for menus and request validation.
    #[must_use]
    pub fn providers_for(&self, kind: CapabilityKind) -> &[String] {
        self.registry.ids_for(kind)
    }

    /// Label of a provider, if it has one.
    #[must_use]
    pub fn label(&self, id: &str) -> Option<&str> {
        self.registry.get(id).and_then(|p| p.instance().label())
    }

    /// Scratch directory handed to `id`'s download handler.
    #[must_use]
    pub fn provider_cache_dir(&self, id: &str) -> PathBuf {
        self.cache_root.join(id)
    }

    /// Root of all provider scratch directories.
    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use crate::providers::provider::{DownloadCapability, GenerateCapability, Provider};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Echo;

    impl Provider for Echo {
        fn id(&self) -> &str {
            "echo"
        }

        fn label(&self) -> Option<&str> {
            Some("Echo Mod Provider")
        }

        fn as_download(&self) -> Option<&dyn DownloadCapability> {
            Some(self)
        }
    }

    #[async_trait]
    impl DownloadCapability for Echo {
        async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
            let name = request
                .metadata
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ProviderError::invalid_metadata("missing 'name'"))?;
            let path = request
                .cache_dir
                .join(format!("{name}-{}.jar", request.minecraft_version));
            std::fs::write(&path, b"jar")?;
            Ok(path)
        }
    }

    struct Asker;

    impl Provider for Asker {
        fn id(&self) -> &str {
            "asker"
        }

        fn as_generate(&self) -> Option<&dyn GenerateCapability> {
            Some(self)
        }
    }

    impl GenerateCapability for Asker {
        fn generate(&self, prompt: &mut dyn Prompt) -> Result<Metadata, ProviderError> {
            let name = prompt
                .ask("Name: ")
                .map_err(|e| ProviderError::Prompt(e.to_string()))?;
            let mut metadata = Metadata::new();
            metadata.insert("name".into(), name.into());
            Ok(metadata)
        }
    }

    fn runner(cache: &TempDir) -> ProviderRunner {
        let mut registry = ProviderRegistry::new();
        registry.register("test", Echo);
        registry.register("test", Asker);
        ProviderRunner::new(registry, cache.path())
    }

    fn metadata(name: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("name".into(), name.into());
        metadata
    }

    #[tokio::test]
    async fn test_download_dispatches_with_provider_cache_dir() {
        let cache = TempDir::new().unwrap();
        let runner = runner(&cache);

        let path = runner.download("echo", "1.20", &metadata("a")).await.unwrap();

        assert_eq!(path, cache.path().join("echo").join("a-1.20.jar"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unknown_provider_is_a_value_not_a_panic() {
        let cache = TempDir::new().unwrap();
        let runner = runner(&cache);

        let err = runner
            .download("nope", "1.20", &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(ref id) if id == "nope"));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_missing_capability_is_reported() {
        let cache = TempDir::new().unwrap();
        let runner = runner(&cache);

        let err = runner
            .download("asker", "1.20", &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::CapabilityNotOffered {
                kind: CapabilityKind::Download,
                ..
            }
        ));

        let mut prompt = ScriptedPrompt::default();
        let err = runner.generate("echo", &mut prompt).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::CapabilityNotOffered {
                kind: CapabilityKind::Generate,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_provider_errors_pass_through_unchanged() {
        let cache = TempDir::new().unwrap();
        let runner = runner(&cache);

        let err = runner
            .download("echo", "1.20", &Metadata::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid metadata: missing 'name'");
    }

    #[test]
    fn test_generate_and_menus() {
        let cache = TempDir::new().unwrap();
        let runner = runner(&cache);

        assert_eq!(runner.providers_for(CapabilityKind::Generate), ["asker"]);
        assert_eq!(runner.providers_for(CapabilityKind::Download), ["echo"]);
        assert_eq!(runner.label("echo"), Some("Echo Mod Provider"));
        assert_eq!(runner.label("asker"), None);

        let mut prompt = ScriptedPrompt::new(["sodium"]);
        let metadata = runner.generate("asker", &mut prompt).unwrap();
        assert_eq!(metadata.get("name").and_then(|v| v.as_str()), Some("sodium"));
    }
}
