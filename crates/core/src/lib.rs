// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! Core library for mcmm, a Minecraft mod manager.
//!
//! - [`providers`] - Capability contract, registry discovery and the runner
//! - [`profile`] - Persisted profiles and per-profile jar caches
//! - [`sync`] - Download into the cache, activate into an installation
//! - [`settings`] / [`paths`] - Where everything lives
//! - [`prompt`] - Interactive input for profile generation
//! - `http` - Request helpers for remote providers (feature `http`)

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod paths;
pub mod profile;
pub mod prompt;
pub mod providers;
pub mod settings;
pub mod sync;

pub use error::{Error, ProviderError, Result};
pub use profile::{ModEntry, Profile, ProfileStore};
pub use settings::Settings;
pub use sync::{ActivationReport, DownloadReport, EntryFault, FaultReason, SyncEngine};
