//! Platform-appropriate default locations for mcmm data.
//!
//! | Platform | Config Dir | Jar Storage | Provider Cache | Minecraft |
//! |----------|------------|-------------|----------------|-----------|
//! | **Linux** | `~/.config/mcmm` | `~/.local/share/mcmm/jar_storage` | `~/.cache/mcmm` | `~/.minecraft` |
//! | **macOS** | `~/Library/Application Support/mcmm` | `~/Library/Application Support/mcmm/jar_storage` | `~/Library/Caches/mcmm` | `~/Library/Application Support/minecraft` |
//! | **Windows** | `%APPDATA%\mcmm` | `%LOCALAPPDATA%\mcmm\jar_storage` | `%LOCALAPPDATA%\mcmm` | `%APPDATA%\.minecraft` |
//!
//! Every function honors an environment variable override, which is also how
//! tests isolate themselves:
//! - `MCMM_CONFIG_DIR`
//! - `MCMM_JAR_STORAGE_DIR`
//! - `MCMM_CACHE_DIR`
//! - `MCMM_MINECRAFT_DIR`

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding [`config_dir`].
pub const CONFIG_DIR_ENV: &str = "MCMM_CONFIG_DIR";
/// Environment variable overriding [`jar_storage_dir`].
pub const JAR_STORAGE_DIR_ENV: &str = "MCMM_JAR_STORAGE_DIR";
/// Environment variable overriding [`cache_dir`].
pub const CACHE_DIR_ENV: &str = "MCMM_CACHE_DIR";
/// Environment variable overriding [`minecraft_dir`].
pub const MINECRAFT_DIR_ENV: &str = "MCMM_MINECRAFT_DIR";

fn env_override(var: &str) -> Option<PathBuf> {
    match std::env::var(var) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => None,
    }
}

/// Directory holding `config.toml` and the `profiles/` records.
///
/// # Errors
///
/// Returns an error if the platform config directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = env_override(CONFIG_DIR_ENV) {
        return Ok(dir);
    }

    let base = dirs::config_dir()
        .ok_or_else(|| Error::configuration("Could not determine config directory"))?;
    Ok(base.join("mcmm"))
}

/// Directory holding one cached jar folder per profile.
///
/// # Errors
///
/// Returns an error if the platform data directory cannot be determined.
pub fn jar_storage_dir() -> Result<PathBuf> {
    if let Some(dir) = env_override(JAR_STORAGE_DIR_ENV) {
        return Ok(dir);
    }

    let base = dirs::data_local_dir()
        .ok_or_else(|| Error::configuration("Could not determine data directory"))?;
    Ok(base.join("mcmm").join("jar_storage"))
}

/// Root of the provider-scoped scratch directories.
///
/// # Errors
///
/// Returns an error if the platform cache directory cannot be determined.
pub fn cache_dir() -> Result<PathBuf> {
    if let Some(dir) = env_override(CACHE_DIR_ENV) {
        return Ok(dir);
    }

    let base =
        dirs::cache_dir().ok_or_else(|| Error::configuration("Could not determine cache directory"))?;
    Ok(base.join("mcmm"))
}

/// Default Minecraft installation directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn minecraft_dir() -> Result<PathBuf> {
    if let Some(dir) = env_override(MINECRAFT_DIR_ENV) {
        return Ok(dir);
    }

    #[cfg(target_os = "macos")]
    let dir = dirs::data_dir().map(|d| d.join("minecraft"));
    #[cfg(target_os = "windows")]
    let dir = dirs::config_dir().map(|d| d.join(".minecraft"));
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let dir = dirs::home_dir().map(|d| d.join(".minecraft"));

    dir.ok_or_else(|| Error::configuration("Could not determine the Minecraft directory"))
}
