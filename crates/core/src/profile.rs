//! Persisted profiles and their per-profile jar caches.
//!
//! A profile lives at `<config>/profiles/<name>.json`:
//!
//! ```json
//! {
//!   "minecraft_folder": "/srv/minecraft",
//!   "minecraft_version": "1.20.1",
//!   "mods": [
//!     { "provider": "modrinth", "metadata": { "id": "AANobbMI" } }
//!   ]
//! }
//! ```
//!
//! Its cached artifacts live flat under `<jar_storage>/<name>/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::providers::Metadata;
use crate::settings::Settings;
use crate::{Error, Result};

const PROFILE_EXTENSION: &str = "json";

/// A named set of mods for one Minecraft version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Installation to activate into. Absent or empty means the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_folder: Option<String>,
    /// Version handed to download handlers unless overridden.
    pub minecraft_version: String,
    /// Entries in download order.
    #[serde(default)]
    pub mods: Vec<ModEntry>,
}

impl Profile {
    /// Create an empty profile targeting `minecraft_version`.
    #[must_use]
    pub fn new(minecraft_version: impl Into<String>) -> Self {
        Self {
            minecraft_folder: None,
            minecraft_version: minecraft_version.into(),
            mods: Vec::new(),
        }
    }

    /// The installation this profile activates into.
    #[must_use]
    pub fn install_dir(&self, default: &Path) -> PathBuf {
        match self.minecraft_folder.as_deref() {
            Some(folder) if !folder.trim().is_empty() => PathBuf::from(folder),
            _ => default.to_path_buf(),
        }
    }
}

/// One mod: which provider fetches it and the provider-specific metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModEntry {
    /// Provider id.
    pub provider: String,
    /// Opaque to everything but the provider.
    #[serde(default)]
    pub metadata: Metadata,
}

impl ModEntry {
    /// Entry for `provider` with `metadata`.
    #[must_use]
    pub fn new(provider: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            provider: provider.into(),
            metadata,
        }
    }
}

/// Reads and writes profile records and their jar caches.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles_dir: PathBuf,
    jar_storage_dir: PathBuf,
}

impl ProfileStore {
    /// Store rooted at the directories in `settings`.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self::from_dirs(settings.profiles_dir(), settings.jar_storage_dir.clone())
    }

    /// Build a store over explicit directories.
    #[must_use]
    pub fn from_dirs(profiles_dir: impl Into<PathBuf>, jar_storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            jar_storage_dir: jar_storage_dir.into(),
        }
    }

    /// Directory holding the `<name>.json` records.
    #[must_use]
    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    /// Path of the record for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfileName`] if `name` cannot be a file name.
    pub fn profile_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self
            .profiles_dir
            .join(format!("{name}.{PROFILE_EXTENSION}")))
    }

    /// Whether a record for `name` exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfileName`] for unusable names.
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.profile_path(name)?.is_file())
    }

    /// Load the record for `name`.
    ///
    /// # Errors
    ///
    /// [`Error::ProfileNotFound`] if there is no record,
    /// [`Error::MalformedProfile`] if it does not parse.
    pub fn load(&self, name: &str) -> Result<Profile> {
        let path = self.profile_path(name)?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::profile_not_found(name, path));
            }
            Err(e) => return Err(Error::io("read", &path, e)),
        };
        serde_json::from_str(&contents).map_err(|e| Error::malformed_profile(name, e.to_string()))
    }

    /// Write the record for `name`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the file cannot be written.
    pub fn save(&self, name: &str, profile: &Profile) -> Result<PathBuf> {
        let path = self.profile_path(name)?;
        std::fs::create_dir_all(&self.profiles_dir)
            .map_err(|e| Error::io("create directory", &self.profiles_dir, e))?;
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| Error::malformed_profile(name, e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| Error::io("write", &path, e))?;
        debug!(profile = name, path = %path.display(), "Saved profile");
        Ok(path)
    }

    /// Names of all stored profiles, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the profiles directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.profiles_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io("read directory", &self.profiles_dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::io("read directory", &self.profiles_dir, e))?
                .path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == PROFILE_EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Directory holding `name`'s cached artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfileName`] for unusable names.
    pub fn cache_dir(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.jar_storage_dir.join(name))
    }

    /// Files currently cached for `name`, sorted. Empty if nothing was ever
    /// downloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory exists but cannot be read.
    pub fn cached_artifacts(&self, name: &str) -> Result<Vec<PathBuf>> {
        let dir = self.cache_dir(name)?;
        let mut files = list_files(&dir)?;
        files.sort();
        Ok(files)
    }

    /// Remove every cached file for `name`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be removed.
    pub fn clear_cache(&self, name: &str) -> Result<usize> {
        let dir = self.cache_dir(name)?;
        let files = list_files(&dir)?;
        for file in &files {
            std::fs::remove_file(file).map_err(|e| Error::io("remove", file, e))?;
        }
        debug!(profile = name, removed = files.len(), "Cleared profile cache");
        Ok(files.len())
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(Error::InvalidProfileName(name.to_string()));
    }
    Ok(())
}

/// Regular files directly inside `dir`; empty if `dir` does not exist.
pub(crate) fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io("read directory", dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io("read directory", dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
