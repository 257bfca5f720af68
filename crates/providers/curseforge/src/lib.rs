//! CurseForge mod provider for mcmm.
//!
//! Looks up an addon's latest file per Minecraft version and downloads it
//! from the CurseForge CDN. The artifact is saved as `<name>.jar`, so a new
//! upstream release replaces the cached one instead of sitting next to it.
//!
//! Metadata: `{"id": "238222", "name": "jei", "check_file_name": "forge"}`
//! (`check_file_name` optional).

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use mcmm_core::ProviderError;
use mcmm_core::http;
use mcmm_core::prompt::{Prompt, ask_optional};
use mcmm_core::providers::{
    DownloadCapability, DownloadRequest, GenerateCapability, Metadata, Provider, ProviderSource,
    metadata_as, metadata_from,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Provider id used in profiles.
pub const ID: &str = "curse_forge";

/// Addon metadata API.
pub const DEFAULT_API_BASE: &str = "https://addons-ecs.forgesvc.net";

/// File CDN.
pub const DEFAULT_CDN_BASE: &str = "https://edge.forgecdn.net";

/// Addon and file ids show up both as numbers and as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum NumericId {
    Number(u64),
    Text(String),
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct CurseForgeMetadata {
    id: NumericId,
    name: String,
    #[serde(default)]
    check_file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Addon {
    #[serde(default)]
    game_version_latest_files: Vec<LatestFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestFile {
    game_version: String,
    project_file_id: NumericId,
    project_file_name: String,
}

/// Downloads mods published on CurseForge.
#[derive(Debug, Clone)]
pub struct CurseForgeModProvider {
    client: Client,
    api_base: String,
    cdn_base: String,
}

impl CurseForgeModProvider {
    /// Create a provider talking to the public endpoints.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::client()?,
            api_base: DEFAULT_API_BASE.to_string(),
            cdn_base: DEFAULT_CDN_BASE.to_string(),
        })
    }

    /// Point the provider at another API host.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Download files from another CDN host.
    #[must_use]
    pub fn with_cdn_base(mut self, cdn_base: impl Into<String>) -> Self {
        self.cdn_base = cdn_base.into().trim_end_matches('/').to_string();
        self
    }

    /// CDN URL of a file: the id is split after its fourth digit.
    fn file_url(&self, file_id: &str, file_name: &str) -> String {
        let split = file_id
            .char_indices()
            .nth(4)
            .map_or(file_id.len(), |(i, _)| i);
        let (head, tail) = file_id.split_at(split);
        format!("{}/files/{head}/{tail}/{file_name}", self.cdn_base)
    }
}

/// Latest file for `minecraft_version`, optionally requiring `check` in its
/// name (case-insensitive).
fn select_file<'a>(
    files: &'a [LatestFile],
    minecraft_version: &str,
    check: Option<&str>,
) -> Option<&'a LatestFile> {
    let check = check.map(str::to_lowercase);
    files.iter().find(|f| {
        f.game_version == minecraft_version
            && check
                .as_deref()
                .is_none_or(|c| f.project_file_name.to_lowercase().contains(c))
    })
}

impl Provider for CurseForgeModProvider {
    fn id(&self) -> &str {
        ID
    }

    fn label(&self) -> Option<&str> {
        Some("Curse Forge Mod Provider")
    }

    fn as_download(&self) -> Option<&dyn DownloadCapability> {
        Some(self)
    }

    fn as_generate(&self) -> Option<&dyn GenerateCapability> {
        Some(self)
    }
}

#[async_trait]
impl DownloadCapability for CurseForgeModProvider {
    async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
        let metadata: CurseForgeMetadata = metadata_as(request.metadata)?;
        if metadata.name.trim().is_empty() || metadata.name.contains(['/', '\\']) {
            return Err(ProviderError::invalid_metadata(format!(
                "'{}' cannot be used as a file name",
                metadata.name
            )));
        }

        let url = format!("{}/api/v2/addon/{}", self.api_base, metadata.id);
        debug!(%url, "Fetching CurseForge addon");
        let addon: Addon = http::get_json(self.client.get(&url)).await?;

        let file = select_file(
            &addon.game_version_latest_files,
            request.minecraft_version,
            metadata.check_file_name.as_deref(),
        )
        .ok_or_else(|| {
            ProviderError::no_matching_artifact(format!(
                "No files for Minecraft {} found!",
                request.minecraft_version
            ))
        })?;

        let file_url = self.file_url(&file.project_file_id.to_string(), &file.project_file_name);
        let dest = http::artifact_path(request.cache_dir, &format!("{}.jar", metadata.name))?;
        http::download_to(self.client.get(&file_url), &dest).await
    }
}

fn ask_metadata(prompt: &mut dyn Prompt) -> std::io::Result<CurseForgeMetadata> {
    let name = prompt.ask("Name: ")?;
    let id = prompt.ask("ID: ")?;
    let check_file_name = ask_optional(
        prompt,
        "Check file name (string that must be in the file name) leave blank for None: ",
    )?;
    Ok(CurseForgeMetadata {
        id: NumericId::Text(id.trim().to_string()),
        name: name.trim().to_string(),
        check_file_name,
    })
}

impl GenerateCapability for CurseForgeModProvider {
    fn generate(&self, prompt: &mut dyn Prompt) -> Result<Metadata, ProviderError> {
        let metadata = ask_metadata(prompt).map_err(|e| ProviderError::Prompt(e.to_string()))?;
        metadata_from(&metadata)
    }
}

/// The source handed to registry discovery.
#[must_use]
pub fn source() -> ProviderSource {
    ProviderSource::new("mcmm-provider-curseforge").with_provider(CurseForgeModProvider::new)
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

    async fn server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/addon/238222"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "gameVersionLatestFiles": [
                    {"gameVersion": "1.20.1", "projectFileId": 4712866, "projectFileName": "jei-1.20.1-fabric-15.2.jar"},
                    {"gameVersion": "1.20.1", "projectFileId": 4712877, "projectFileName": "jei-1.20.1-forge-15.2.jar"},
                    {"gameVersion": "1.19.2", "projectFileId": 4405345, "projectFileName": "jei-1.19.2-forge-11.6.jar"}
                ]
            })))
            .mount(&server)
            .await;
        for (head, tail, name) in [
            ("4712", "866", "jei-1.20.1-fabric-15.2.jar"),
            ("4712", "877", "jei-1.20.1-forge-15.2.jar"),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/files/{head}/{tail}/{name}")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
                .mount(&server)
                .await;
        }
        server
    }

    async fn download(
        server: &MockServer,
        cache: &TempDir,
        minecraft_version: &str,
        metadata: &Metadata,
    ) -> Result<PathBuf, ProviderError> {
        CurseForgeModProvider::new()
            .unwrap()
            .with_api_base(server.uri())
            .with_cdn_base(server.uri())
            .download(&DownloadRequest {
                minecraft_version,
                metadata,
                cache_dir: cache.path(),
            })
            .await
    }

    #[tokio::test]
    async fn test_downloads_first_file_for_version_under_stable_name() {
        let server = server().await;
        let cache = TempDir::new().unwrap();
        let metadata = metadata(json!({"id": "238222", "name": "jei", "check_file_name": null}));

        let out = download(&server, &cache, "1.20.1", &metadata).await.unwrap();

        assert_eq!(out, cache.path().join("jei.jar"));
        assert_eq!(std::fs::read(out).unwrap(), b"jei-1.20.1-fabric-15.2.jar");
    }

    #[tokio::test]
    async fn test_check_file_name_is_case_insensitive() {
        let server = server().await;
        let cache = TempDir::new().unwrap();
        let metadata = metadata(json!({"id": 238222, "name": "jei", "check_file_name": "FORGE"}));

        let out = download(&server, &cache, "1.20.1", &metadata).await.unwrap();
        assert_eq!(std::fs::read(out).unwrap(), b"jei-1.20.1-forge-15.2.jar");
    }

    #[tokio::test]
    async fn test_no_file_for_version() {
        let server = server().await;
        let cache = TempDir::new().unwrap();
        let metadata = metadata(json!({"id": "238222", "name": "jei"}));

        let err = download(&server, &cache, "1.16.5", &metadata).await.unwrap_err();
        assert_eq!(err.to_string(), "No matching artifact: No files for Minecraft 1.16.5 found!");
    }

    #[test]
    fn test_file_url_splits_id() {
        let provider = CurseForgeModProvider::new().unwrap();
        assert_eq!(
            provider.file_url("3544188", "fabric-api-0.40.jar"),
            "https://edge.forgecdn.net/files/3544/188/fabric-api-0.40.jar"
        );
    }

    #[test]
    fn test_generate() {
        let provider = CurseForgeModProvider::new().unwrap();
        let mut prompt = ScriptedPrompt::new(["jei", "238222", ""]);

        let metadata = provider.generate(&mut prompt).unwrap();

        assert_eq!(
            serde_json::Value::Object(metadata),
            json!({"id": "238222", "name": "jei", "check_file_name": null})
        );
    }
}
