//! Subcommand implementations.
//!
//! Each command returns an [`Output`]: a human-readable rendering plus the
//! same result as JSON, so the dispatcher can honor `--json` uniformly.

pub mod activate;
pub mod deactivate;
pub mod download;
pub mod generate;
pub mod list;
pub mod providers;

use mcmm_core::providers::{ProviderRegistry, ProviderRunner, ProviderSource};
use mcmm_core::{ProfileStore, Settings, SyncEngine};
use serde::Serialize;

use crate::cli::{
    CliError, EXIT_OK, ErrorEnvelope, OkEnvelope, exit_code_for, render_error,
};

/// Everything a command needs, built once per invocation.
#[derive(Debug)]
pub struct Context {
    /// Resolved directories and defaults.
    pub settings: Settings,
    /// Profile records and per-profile jar caches.
    pub store: ProfileStore,
    /// Provider dispatch.
    pub runner: ProviderRunner,
}

impl Context {
    /// Discover providers from `sources` and wire up the profile store.
    #[must_use]
    pub fn new(settings: Settings, sources: Vec<ProviderSource>) -> Self {
        let discovery = ProviderRegistry::discover(sources);
        let runner = ProviderRunner::new(discovery.registry, settings.provider_cache_dir.clone());
        let store = ProfileStore::new(&settings);
        Self {
            settings,
            store,
            runner,
        }
    }

    /// Sync engine over this context's settings and store.
    #[must_use]
    pub fn engine(&self) -> SyncEngine<'_> {
        SyncEngine::new(&self.settings, &self.store)
    }
}

/// Result of a command, ready to print.
#[derive(Debug)]
pub struct Output {
    text: String,
    data: serde_json::Value,
    failure: Option<CliError>,
}

impl Output {
    /// Successful output.
    pub fn new(text: impl Into<String>, data: &impl Serialize) -> Result<Self, CliError> {
        let data = serde_json::to_value(data)
            .map_err(|e| CliError::other(format!("Failed to serialize command output: {e}")))?;
        Ok(Self {
            text: text.into(),
            data,
            failure: None,
        })
    }

    /// Mark the command as failed while still printing its output.
    #[must_use]
    pub fn with_failure(mut self, failure: CliError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Human-readable rendering.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// JSON rendering.
    #[must_use]
    pub const fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// The failure attached with [`Self::with_failure`], if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&CliError> {
        self.failure.as_ref()
    }

    /// Print to stdout (errors to stderr) and return the exit code.
    pub fn emit(self, json_mode: bool) -> i32 {
        if json_mode {
            let rendered = match &self.failure {
                None => serde_json::to_string(&OkEnvelope::new(&self.data)),
                Some(err) => serde_json::to_string(&ErrorEnvelope::new(serde_json::json!({
                    "code": err.code(),
                    "message": err.to_string(),
                    "data": self.data,
                }))),
            };
            match rendered {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("Error serializing command output"),
            }
        } else {
            if !self.text.is_empty() {
                println!("{}", self.text);
            }
            if let Some(err) = &self.failure {
                render_error(err, false);
            }
        }
        self.failure.as_ref().map_or(EXIT_OK, exit_code_for)
    }
}
