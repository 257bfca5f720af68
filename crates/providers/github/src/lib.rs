//! GitHub mod provider for mcmm.
//!
//! Two ways to get a jar out of a repository:
//!
//! - **releases**: take an asset from the latest release, or from the most
//!   recently published release whose tag contains a given string.
//! - **compile**: clone the repository, check out a branch, run a build
//!   command and pick a jar from the output directory.
//!
//! Metadata:
//!
//! ```json
//! {
//!   "repo": "CaffeineMC/sodium-fabric",
//!   "releases": {"latest": true, "tag": null, "must_contain": [], "must_not_contain": ["dev"]},
//!   "compile": null
//! }
//! ```
//!
//! API requests are authenticated with `GITHUB_TOKEN` (or `GH_TOKEN`) when set.

mod compile;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mcmm_core::ProviderError;
use mcmm_core::http;
use mcmm_core::prompt::{Prompt, ask_list, ask_optional, confirm};
use mcmm_core::providers::{
    DownloadCapability, DownloadRequest, GenerateCapability, Metadata, NameFilter, Provider,
    ProviderSource, metadata_as, metadata_from,
};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use compile::CompileSpec;

/// Provider id used in profiles.
pub const ID: &str = "github";

/// Public GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Where repositories are cloned from in compile mode.
pub const DEFAULT_CLONE_BASE: &str = "https://github.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct GitHubMetadata {
    repo: String,
    #[serde(default)]
    releases: Option<ReleasesSpec>,
    #[serde(default)]
    compile: Option<CompileSpec>,
}

/// Which release to take an asset from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleasesSpec {
    /// Use `releases/latest` and ignore `tag`.
    #[serde(default)]
    pub latest: bool,
    /// Substring the release tag must contain.
    #[serde(default)]
    pub tag: Option<String>,
    /// Applied to asset names.
    #[serde(flatten)]
    pub filter: NameFilter,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

/// Read the API token from `GITHUB_TOKEN`, falling back to `GH_TOKEN`.
#[must_use]
pub fn token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|token| !token.is_empty())
}

/// Downloads mods from GitHub releases or builds them from source.
#[derive(Debug, Clone)]
pub struct GitHubModProvider {
    client: Client,
    api_base: String,
    clone_base: String,
    token: Option<String>,
}

impl GitHubModProvider {
    /// Create a provider talking to github.com, authenticated from the
    /// environment if a token is set.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::client()?,
            api_base: DEFAULT_API_BASE.to_string(),
            clone_base: DEFAULT_CLONE_BASE.to_string(),
            token: token_from_env(),
        })
    }

    /// Point the provider at another API host.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Clone repositories from another host (or a local directory).
    #[must_use]
    pub fn with_clone_base(mut self, clone_base: impl Into<String>) -> Self {
        self.clone_base = clone_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the API token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn release(&self, repo: &str, spec: &ReleasesSpec) -> Result<Release, ProviderError> {
        if spec.latest {
            let url = format!("{}/repos/{repo}/releases/latest", self.api_base);
            debug!(%url, "Fetching latest GitHub release");
            return http::get_json(self.get(&url)).await;
        }

        let url = format!("{}/repos/{repo}/releases?per_page=100", self.api_base);
        debug!(%url, "Fetching GitHub releases");
        let releases: Vec<Release> = http::get_json(self.get(&url)).await?;
        let tag = spec.tag.as_deref().unwrap_or_default();

        releases
            .into_iter()
            .filter(|r| r.tag_name.contains(tag))
            .max_by_key(|r| r.published_at)
            .ok_or_else(|| {
                ProviderError::no_matching_artifact(format!(
                    "no release of {repo} has a tag containing '{tag}'"
                ))
            })
    }

    async fn download_release(
        &self,
        repo: &str,
        spec: &ReleasesSpec,
        request: &DownloadRequest<'_>,
    ) -> Result<PathBuf, ProviderError> {
        let release = self.release(repo, spec).await?;
        let asset = release
            .assets
            .iter()
            .find(|a| spec.filter.matches(&a.name))
            .ok_or_else(|| {
                ProviderError::no_matching_artifact(format!(
                    "release {} of {repo} has no matching asset",
                    release.tag_name
                ))
            })?;

        let dest = http::artifact_path(request.cache_dir, &asset.name)?;
        http::download_to(self.get(&asset.browser_download_url), &dest).await
    }
}

impl Provider for GitHubModProvider {
    fn id(&self) -> &str {
        ID
    }

    fn label(&self) -> Option<&str> {
        Some("GitHub Mod Provider")
    }

    fn as_download(&self) -> Option<&dyn DownloadCapability> {
        Some(self)
    }

    fn as_generate(&self) -> Option<&dyn GenerateCapability> {
        Some(self)
    }
}

#[async_trait]
impl DownloadCapability for GitHubModProvider {
    async fn download(&self, request: &DownloadRequest<'_>) -> Result<PathBuf, ProviderError> {
        let metadata: GitHubMetadata = metadata_as(request.metadata)?;
        match (&metadata.releases, &metadata.compile) {
            (Some(spec), _) => self.download_release(&metadata.repo, spec, request).await,
            (None, Some(spec)) => {
                let url = format!("{}/{}", self.clone_base, metadata.repo);
                compile::build(&url, &metadata.repo, spec, request.cache_dir).await
            }
            (None, None) => Err(ProviderError::invalid_metadata(
                "'releases' or 'compile' must be defined",
            )),
        }
    }
}

fn ask_metadata(prompt: &mut dyn Prompt) -> std::io::Result<GitHubMetadata> {
    let repo = prompt
        .ask("Repo name (ex. 'BrenekH/mc-mod-manager'): ")?
        .trim()
        .to_string();

    loop {
        match prompt.ask("Input 'release' or 'compile': ")?.trim().to_lowercase().as_str() {
            "release" => {
                let latest = confirm(prompt, "Use latest release (y/n): ")?;
                let tag = ask_optional(prompt, "Target tag(empty for None): ")?;
                let filter = NameFilter::prompt(prompt)?;
                return Ok(GitHubMetadata {
                    repo,
                    releases: Some(ReleasesSpec {
                        latest,
                        tag,
                        filter,
                    }),
                    compile: None,
                });
            }
            "compile" => {
                let branch = prompt.ask("Branch: ")?;
                let dir = prompt.ask("Relative directory to find jars in: ")?;
                let command = ask_list(prompt, "Command for building jar (one argument per line): ")?;
                let filter = NameFilter::prompt(prompt)?;
                return Ok(GitHubMetadata {
                    repo,
                    releases: None,
                    compile: Some(CompileSpec {
                        branch,
                        command,
                        dir,
                        filter,
                    }),
                });
            }
            _ => {}
        }
    }
}

impl GenerateCapability for GitHubModProvider {
    fn generate(&self, prompt: &mut dyn Prompt) -> Result<Metadata, ProviderError> {
        let metadata = ask_metadata(prompt).map_err(|e| ProviderError::Prompt(e.to_string()))?;
        metadata_from(&metadata)
    }
}

/// The source handed to registry discovery.
#[must_use]
pub fn source() -> ProviderSource {
    ProviderSource::new("mcmm-provider-github").with_provider(GitHubModProvider::new)
}
