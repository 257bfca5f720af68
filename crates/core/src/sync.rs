//! Profile synchronization: download into the jar cache, then activate.
//!
//! [`SyncEngine::download`] refreshes a profile's cache from scratch. Every
//! mod entry is attempted; failures (including handler panics) are collected
//! into the [`DownloadReport`] instead of aborting the batch.
//!
//! [`SyncEngine::activate`] makes a profile live. It removes **every** `*.jar`
//! in `<install>/mods`, whether mcmm put it there or not, then copies the
//! profile's cached jars in. I/O failures abort activation immediately.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use futures::FutureExt;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::error::ProviderError;
use crate::profile::{ModEntry, ProfileStore, list_files};
use crate::prompt::Prompt;
use crate::providers::ProviderRunner;
use crate::settings::Settings;
use crate::{Error, Result};

/// Extension of the artifacts activation manages.
pub const ARTIFACT_EXTENSION: &str = "jar";

/// Subdirectory of an installation that holds mods.
pub const MODS_DIR: &str = "mods";

/// Why one mod entry produced no cached artifact.
#[derive(Error, Debug)]
pub enum FaultReason {
    /// The runner or the provider reported a failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider's handler panicked.
    #[error("provider panicked: {0}")]
    Panicked(String),

    /// The artifact was produced but could not be moved into the cache.
    #[error("could not store artifact: {0}")]
    Store(#[source] Error),

    /// An earlier entry already cached an artifact with the same file name.
    #[error("artifact {} was already cached by an earlier entry", .0.display())]
    Duplicate(PathBuf),
}

/// A failed mod entry, identified by its position in the profile.
#[derive(Debug)]
pub struct EntryFault {
    /// Zero-based position of the entry in the profile.
    pub index: usize,
    /// The entry as stored.
    pub entry: ModEntry,
    /// What went wrong.
    pub reason: FaultReason,
}

/// Outcome of [`SyncEngine::download`].
#[derive(Debug)]
pub struct DownloadReport {
    /// Profile name.
    pub profile: String,
    /// Version the handlers were asked for (override or stored).
    pub minecraft_version: String,
    /// Stale files removed before downloading.
    pub cleared: usize,
    /// Cached artifacts, in entry order.
    pub artifacts: Vec<PathBuf>,
    /// Failed entries, in entry order.
    pub faults: Vec<EntryFault>,
}

impl DownloadReport {
    /// Whether every entry produced an artifact.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.faults.is_empty()
    }

    /// Number of failed entries.
    #[must_use]
    pub fn fault_count(&self) -> usize {
        self.faults.len()
    }
}

/// Outcome of [`SyncEngine::activate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    /// Profile name.
    pub profile: String,
    /// `<install>/mods`.
    pub mods_dir: PathBuf,
    /// Jars deleted from the mods directory.
    pub removed: Vec<PathBuf>,
    /// Jars copied in from the profile cache.
    pub installed: Vec<PathBuf>,
}

/// Drives downloads and activation for stored profiles.
#[derive(Debug, Clone, Copy)]
pub struct SyncEngine<'a> {
    settings: &'a Settings,
    store: &'a ProfileStore,
}

impl<'a> SyncEngine<'a> {
    /// Engine over `settings` and the profiles in `store`.
    #[must_use]
    pub fn new(settings: &'a Settings, store: &'a ProfileStore) -> Self {
        Self { settings, store }
    }

    /// Refresh `profile`'s cache: clear it, then download every entry in order.
    ///
    /// # Errors
    ///
    /// Only configuration and cache-clearing failures are errors. Per-entry
    /// failures are reported in [`DownloadReport::faults`].
    #[instrument(skip(self, runner))]
    pub async fn download(
        &self,
        profile: &str,
        runner: &ProviderRunner,
        version_override: Option<&str>,
    ) -> Result<DownloadReport> {
        let stored = self.store.load(profile)?;
        let minecraft_version = version_override
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(&stored.minecraft_version)
            .to_string();

        let cleared = self.store.clear_cache(profile)?;
        let cache_dir = self.store.cache_dir(profile)?;
        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| Error::io("create directory", &cache_dir, e))?;

        let mut report = DownloadReport {
            profile: profile.to_string(),
            minecraft_version,
            cleared,
            artifacts: Vec::new(),
            faults: Vec::new(),
        };

        for (index, entry) in stored.mods.into_iter().enumerate() {
            let outcome = AssertUnwindSafe(runner.download(
                &entry.provider,
                &report.minecraft_version,
                &entry.metadata,
            ))
            .catch_unwind()
            .await;

            let reason = match outcome {
                Ok(Ok(artifact)) => match move_into(&artifact, &cache_dir, &report.artifacts) {
                    Ok(cached) => {
                        debug!(index, provider = %entry.provider, artifact = %cached.display(), "Cached artifact");
                        report.artifacts.push(cached);
                        continue;
                    }
                    Err(reason) => reason,
                },
                Ok(Err(e)) => FaultReason::Provider(e),
                Err(payload) => FaultReason::Panicked(panic_message(payload.as_ref())),
            };

            warn!(index, provider = %entry.provider, error = %reason, "Mod entry failed");
            report.faults.push(EntryFault {
                index,
                entry,
                reason,
            });
        }

        info!(
            artifacts = report.artifacts.len(),
            faults = report.faults.len(),
            "Download finished"
        );
        Ok(report)
    }

    /// Replace the jars in `profile`'s installation with its cached jars.
    ///
    /// # Errors
    ///
    /// Fails before touching anything if the profile or the installation is
    /// missing; fails immediately on any removal or copy error.
    #[instrument(skip(self))]
    pub fn activate(&self, profile: &str) -> Result<ActivationReport> {
        let stored = self.store.load(profile)?;
        let install_dir = stored.install_dir(&self.settings.minecraft_dir);
        let mods_dir = mods_dir_of(&install_dir)?;
        let artifacts = self.store.cached_artifacts(profile)?;

        std::fs::create_dir_all(&mods_dir)
            .map_err(|e| Error::io("create directory", &mods_dir, e))?;
        let removed = remove_jars(&mods_dir)?;

        let mut installed = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let Some(file_name) = artifact.file_name() else {
                continue;
            };
            let target = mods_dir.join(file_name);
            std::fs::copy(&artifact, &target).map_err(|e| Error::io("copy", &artifact, e))?;
            debug!(jar = %target.display(), "Installed");
            installed.push(target);
        }

        info!(
            mods_dir = %mods_dir.display(),
            removed = removed.len(),
            installed = installed.len(),
            "Activated profile"
        );
        Ok(ActivationReport {
            profile: profile.to_string(),
            mods_dir,
            removed,
            installed,
        })
    }

    /// Remove every jar from the mods directory of `install_dir`, or of the
    /// default installation. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Fails if the installation does not exist or a jar cannot be removed.
    pub fn deactivate(&self, install_dir: Option<&Path>) -> Result<usize> {
        let install_dir = install_dir.unwrap_or(&self.settings.minecraft_dir);
        let mods_dir = mods_dir_of(install_dir)?;
        Ok(remove_jars(&mods_dir)?.len())
    }
}

/// Run `provider_id`'s generation handler and wrap its metadata into an entry.
///
/// # Errors
///
/// Whatever the runner or the handler reports; nothing is created then.
pub fn generate_entry(
    runner: &ProviderRunner,
    provider_id: &str,
    prompt: &mut dyn Prompt,
) -> std::result::Result<ModEntry, ProviderError> {
    let metadata = runner.generate(provider_id, prompt)?;
    Ok(ModEntry::new(provider_id, metadata))
}

fn mods_dir_of(install_dir: &Path) -> Result<PathBuf> {
    if !install_dir.is_dir() {
        return Err(Error::InstallationNotFound {
            path: install_dir.to_path_buf(),
        });
    }
    Ok(install_dir.join(MODS_DIR))
}

fn remove_jars(mods_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in list_files(mods_dir)? {
        if path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION) {
            std::fs::remove_file(&path).map_err(|e| Error::io("remove", &path, e))?;
            info!(jar = %path.display(), "Removed");
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}

/// Move `artifact` into `dir` under the same file name, never replacing one
/// of the `cached` artifacts.
fn move_into(
    artifact: &Path,
    dir: &Path,
    cached: &[PathBuf],
) -> std::result::Result<PathBuf, FaultReason> {
    let file_name = artifact.file_name().ok_or_else(|| {
        FaultReason::Store(Error::configuration(format!(
            "provider returned a path without a file name: {}",
            artifact.display()
        )))
    })?;
    let target = dir.join(file_name);
    if cached.contains(&target) {
        return Err(FaultReason::Duplicate(target));
    }
    if target == artifact {
        return Ok(target);
    }

    if std::fs::rename(artifact, &target).is_err() {
        // Cross-device moves need copy + remove.
        std::fs::copy(artifact, &target)
            .map_err(|e| FaultReason::Store(Error::io("copy", artifact, e)))?;
        std::fs::remove_file(artifact)
            .map_err(|e| FaultReason::Store(Error::io("remove", artifact, e)))?;
    }
    Ok(target)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
