//! Process-wide settings, resolved once at startup and passed by reference.
//!
//! Resolution order, lowest to highest precedence:
//!
//! 1. Platform defaults from [`crate::paths`]
//! 2. `config.toml` in the config directory (every field optional)
//! 3. `MCMM_*` environment variables

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, paths};

/// Minecraft version offered when generating a profile.
pub const DEFAULT_MINECRAFT_VERSION: &str = "1.17";

/// Name of the optional config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ConfigFile {
    /// Where downloaded jars are cached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jar_storage_dir: Option<PathBuf>,

    /// Provider scratch space.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_cache_dir: Option<PathBuf>,

    /// Default Minecraft installation, used when a profile has no override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft_dir: Option<PathBuf>,

    /// Suggested version when generating a profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_minecraft_version: Option<String>,
}

impl ConfigFile {
    /// Read `path`, returning the empty config if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::io("read", path, e)),
        };
        toml::from_str(&contents)
            .map_err(|e| Error::configuration(format!("{}: {e}", path.display())))
    }
}

/// Resolved locations and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Holds `config.toml` and `profiles/`.
    pub config_dir: PathBuf,
    /// Holds one directory of cached jars per profile.
    pub jar_storage_dir: PathBuf,
    /// Root of the provider-scoped scratch directories.
    pub provider_cache_dir: PathBuf,
    /// Installation used when a profile does not name one.
    pub minecraft_dir: PathBuf,
    /// Suggested by `generate` when the user leaves the version empty.
    pub default_minecraft_version: String,
}

impl Settings {
    /// Resolve settings from platform defaults, `config.toml` and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a platform directory cannot be determined or the
    /// config file is malformed.
    pub fn load() -> Result<Self> {
        let config_dir = paths::config_dir()?;
        let file = ConfigFile::load(&config_dir.join(CONFIG_FILE_NAME))?;
        debug!(config_dir = %config_dir.display(), ?file, "Loaded configuration");

        // Env overrides beat the config file, which beats platform defaults.
        let pick = |env: &str, from_file: Option<PathBuf>, default: fn() -> Result<PathBuf>| {
            if std::env::var_os(env).is_some_and(|v| !v.is_empty()) {
                default()
            } else {
                from_file.map_or_else(default, Ok)
            }
        };

        Ok(Self {
            jar_storage_dir: pick(
                paths::JAR_STORAGE_DIR_ENV,
                file.jar_storage_dir,
                paths::jar_storage_dir,
            )?,
            provider_cache_dir: pick(
                paths::CACHE_DIR_ENV,
                file.provider_cache_dir,
                paths::cache_dir,
            )?,
            minecraft_dir: pick(
                paths::MINECRAFT_DIR_ENV,
                file.minecraft_dir,
                paths::minecraft_dir,
            )?,
            default_minecraft_version: file
                .default_minecraft_version
                .unwrap_or_else(|| DEFAULT_MINECRAFT_VERSION.to_string()),
            config_dir,
        })
    }

    /// Self-contained layout under `root`, for tests and portable installs.
    #[must_use]
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            jar_storage_dir: root.join("jar_storage"),
            provider_cache_dir: root.join("cache"),
            minecraft_dir: root.join("minecraft"),
            default_minecraft_version: DEFAULT_MINECRAFT_VERSION.to_string(),
        }
    }

    /// Directory holding `<profile>.json` records.
    #[must_use]
    pub fn profiles_dir(&self) -> PathBuf {
        self.config_dir.join("profiles")
    }
}
