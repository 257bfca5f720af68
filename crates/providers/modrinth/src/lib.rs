//! Modrinth mod provider for mcmm.
//!
//! Lists a project's versions through the Modrinth API and downloads the
//! first file that fits the requested Minecraft version, mod loader, release
//! channel and file name filters. The API returns versions newest first.
//!
//! Metadata:
//!
//! ```json
//! {
//!   "id": "AANobbMI",
//!   "allow_prereleases": false,
//!   "mod_loader": "fabric",
//!   "must_contain": [],
//!   "must_not_contain": ["sources"]
//! }
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use mcmm_core::ProviderError;
use mcmm_core::http;
use mcmm_core::prompt::{Prompt, confirm};
use mcmm_core::providers::{
    DownloadCapability, DownloadRequest, GenerateCapability, Metadata, NameFilter, Provider,
    ProviderSource, metadata_as, metadata_from,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Provider id used in profiles.
pub const ID: &str = "modrinth";

/// Public Modrinth API.
pub const DEFAULT_API_BASE: &str = "https://api.modrinth.com";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct ModrinthMetadata {
    id: String,
    #[serde(default)]
    allow_prereleases: bool,
    mod_loader: String,
    #[serde(flatten)]
    filter: NameFilter,
}

/// One entry of `GET /v2/project/{id}/version`.
#[derive(Debug, Deserialize)]
struct Version {
    version_type: String,
    #[serde(default)]
    loaders: Vec<String>,
    #[serde(default)]
    game_versions: Vec<String>,
    #[serde(default)]
    files: Vec<VersionFile>,
}

#[derive(Debug, Deserialize)]
struct VersionFile {
    filename: String,
    url: String,
}

/// Downloads mods published on Modrinth.
#[derive(Debug, Clone)]
pub struct ModrinthModProvider {
    client: Client,
    api_base: String,
}

impl ModrinthModProvider {
    /// Create a provider talking to the public API.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::client()?,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Point the provider at another API host.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn versions(&self, project: &str) -> Result<Vec<Version>, ProviderError> {
        let url = format!("{}/v2/project/{project}/version", self.api_base);
        debug!(%url, "Fetching Modrinth versions");
        http::get_json(self.client.get(&url)).await
    }
}

/// First file, newest version first, that passes every constraint.
fn select_file<'a>(
    versions: &'a [Version],
    metadata: &ModrinthMetadata,
    minecraft_version: &str,
) -> Option<&'a VersionFile> {
    versions
        .iter()
        .filter(|v| metadata.allow_prereleases || v.version_type == "release")
        .filter(|v| v.loaders.iter().any(|l| l == &metadata.mod_loader))
        .filter(|v| v.game_versions.iter().any(|g| g == minecraft_version))
        .flat_map(|v| &v.files)
        .find(|f| metadata.filter.matches(&f.filename))
}

impl Provider for ModrinthModProvider {
    fn id(&self) -> &str {
        ID
    }

    fn label(&self) -> Option<&str> {
        Some("Modrinth Mod Provider")
    }

    fn as_download(&self) -> Option<&dyn DownloadCapability> {
        Some(self)
    }

    fn as_generate(&self) -> Option<&dyn GenerateCapability> {
        Some(self)
    }
}

#[async_trait]
impl DownloadCapability for ModrinthModProvider {
    async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
        let metadata: ModrinthMetadata = metadata_as(request.metadata)?;
        let versions = self.versions(&metadata.id).await?;

        let file = select_file(&versions, &metadata, request.minecraft_version).ok_or_else(|| {
            ProviderError::no_matching_artifact(format!(
                "no {} file of '{}' for Minecraft {}",
                metadata.mod_loader, metadata.id, request.minecraft_version
            ))
        })?;

        let dest = http::artifact_path(request.cache_dir, &file.filename)?;
        http::download_to(self.client.get(&file.url), &dest).await
    }
}

fn ask_metadata(prompt: &mut dyn Prompt) -> std::io::Result<ModrinthMetadata> {
    let id = prompt.ask("Mod ID: ")?;
    let allow_prereleases = confirm(prompt, "Allow Pre-Releases (y/n): ")?;
    let mod_loader = prompt.ask("Mod Loader (ex. 'fabric' or 'forge'): ")?;
    Ok(ModrinthMetadata {
        id: id.trim().to_string(),
        allow_prereleases,
        mod_loader: mod_loader.trim().to_lowercase(),
        filter: NameFilter::prompt(prompt)?,
    })
}

impl GenerateCapability for ModrinthModProvider {
    fn generate(&self, prompt: &mut dyn Prompt) -> Result<Metadata, ProviderError> {
        let metadata = ask_metadata(prompt).map_err(|e| ProviderError::Prompt(e.to_string()))?;
        metadata_from(&metadata)
    }
}

/// The source handed to registry discovery.
#[must_use]
pub fn source() -> ProviderSource {
    ProviderSource::new("mcmm-provider-modrinth").with_provider(ModrinthModProvider::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcmm_core::prompt::ScriptedPrompt;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn metadata(value: serde_json::Value) -> Metadata {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn versions(server: &MockServer) -> serde_json::Value {
        let uri = server.uri();
        json!([
            {
                "version_type": "beta",
                "loaders": ["fabric"],
                "game_versions": ["1.20.1"],
                "files": [{"filename": "sodium-beta.jar", "url": format!("{uri}/files/sodium-beta.jar")}]
            },
            {
                "version_type": "release",
                "loaders": ["quilt"],
                "game_versions": ["1.20.1"],
                "files": [{"filename": "sodium-quilt.jar", "url": format!("{uri}/files/sodium-quilt.jar")}]
            },
            {
                "version_type": "release",
                "loaders": ["fabric", "quilt"],
                "game_versions": ["1.20", "1.20.1"],
                "files": [
                    {"filename": "sodium-0.5-sources.jar", "url": format!("{uri}/files/sodium-0.5-sources.jar")},
                    {"filename": "sodium-0.5.jar", "url": format!("{uri}/files/sodium-0.5.jar")}
                ]
            }
        ])
    }

    async fn server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/project/AANobbMI/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(versions(&server)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/sodium-0.5.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"release".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/sodium-beta.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"beta".to_vec()))
            .mount(&server)
            .await;
        server
    }

    async fn download(
        server: &MockServer,
        cache: &TempDir,
        minecraft_version: &str,
        metadata: &Metadata,
    ) -> Result<PathBuf, ProviderError> {
        ModrinthModProvider::new()
            .unwrap()
            .with_api_base(server.uri())
            .download(&DownloadRequest {
                minecraft_version,
                metadata,
                cache_dir: cache.path(),
            })
            .await
    }

    #[tokio::test]
    async fn test_picks_release_matching_loader_version_and_filter() {
        let server = server().await;
        let cache = TempDir::new().unwrap();
        let metadata = metadata(json!({
            "id": "AANobbMI",
            "allow_prereleases": false,
            "mod_loader": "fabric",
            "must_contain": [],
            "must_not_contain": ["sources"]
        }));

        let out = download(&server, &cache, "1.20.1", &metadata).await.unwrap();

        assert_eq!(out, cache.path().join("sodium-0.5.jar"));
        assert_eq!(std::fs::read(out).unwrap(), b"release");
    }

    #[tokio::test]
    async fn test_prereleases_when_allowed() {
        let server = server().await;
        let cache = TempDir::new().unwrap();
        let metadata = metadata(json!({
            "id": "AANobbMI",
            "allow_prereleases": true,
            "mod_loader": "fabric"
        }));

        let out = download(&server, &cache, "1.20.1", &metadata).await.unwrap();
        assert_eq!(out, cache.path().join("sodium-beta.jar"));
    }

    #[tokio::test]
    async fn test_no_match_for_version() {
        let server = server().await;
        let cache = TempDir::new().unwrap();
        let metadata = metadata(json!({"id": "AANobbMI", "mod_loader": "fabric"}));

        let err = download(&server, &cache, "1.12.2", &metadata).await.unwrap_err();
        assert!(matches!(err, ProviderError::NoMatchingArtifact(_)), "{err}");
    }

    #[tokio::test]
    async fn test_unknown_project_is_http_error() {
        let server = server().await;
        let cache = TempDir::new().unwrap();
        let metadata = metadata(json!({"id": "nope", "mod_loader": "fabric"}));

        let err = download(&server, &cache, "1.20.1", &metadata).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http { status: 404, .. }), "{err}");
    }

    #[tokio::test]
    async fn test_server_file_names_stay_inside_cache() {
        let server = MockServer::start().await;
        let root = TempDir::new().unwrap();
        let cache = root.path().join("modrinth");
        std::fs::create_dir_all(&cache).unwrap();
        let outside = root.path().join("escaped.jar");
        let metadata = metadata(json!({"id": "evil", "mod_loader": "fabric"}));
        let provider = ModrinthModProvider::new()
            .unwrap()
            .with_api_base(server.uri());

        for filename in ["../escaped.jar", outside.to_str().unwrap()] {
            server.reset().await;
            Mock::given(method("GET"))
                .and(path("/v2/project/evil/version"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                    "version_type": "release",
                    "loaders": ["fabric"],
                    "game_versions": ["1.20.1"],
                    "files": [{"filename": filename, "url": format!("{}/files/evil.jar", server.uri())}]
                }])))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/files/evil.jar"))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(b"evil".to_vec()))
                .mount(&server)
                .await;

            let err = provider
                .download(&DownloadRequest {
                    minecraft_version: "1.20.1",
                    metadata: &metadata,
                    cache_dir: &cache,
                })
                .await
                .unwrap_err();

            assert!(matches!(err, ProviderError::InvalidMetadata(_)), "{filename}: {err}");
            assert!(!outside.exists(), "{filename} escaped the cache");
        }
    }

    #[test]
    fn test_generate() {
        let provider = ModrinthModProvider::new().unwrap();
        let mut prompt =
            ScriptedPrompt::new(["AANobbMI", "n", "Fabric", "", "sources", "dev", ""]);

        let metadata = provider.generate(&mut prompt).unwrap();

        assert_eq!(
            serde_json::Value::Object(metadata),
            json!({
                "id": "AANobbMI",
                "allow_prereleases": false,
                "mod_loader": "fabric",
                "must_contain": [],
                "must_not_contain": ["sources", "dev"]
            })
        );
    }
}
