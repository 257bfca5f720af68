//! Mod provider system.
//!
//! Mod providers fetch artifacts from one kind of remote source (Modrinth,
//! GitHub releases, a local file, ...) and know how to ask the user for the
//! metadata that identifies a mod on that source.
//!
//! # Architecture
//!
//! - [`Provider`] - Base trait: id, label and capability accessors
//! - [`DownloadCapability`] / [`GenerateCapability`] - The two handler kinds
//! - [`ProviderSource`] - A named bundle of provider factories (one per provider crate)
//! - [`ProviderRegistry`] - Built from sources; indexes providers by id and by capability
//! - [`ProviderRunner`] - Dispatches to a provider by id and capability kind
//!
//! # Example
//!
//! ```ignore
//! use mcmm_core::providers::{ProviderRegistry, ProviderRunner};
//!
//! let discovery = ProviderRegistry::discover([
//!     mcmm_provider_file::source(),
//!     mcmm_provider_modrinth::source(),
//! ]);
//! let runner = ProviderRunner::new(discovery.registry, settings.provider_cache_dir.clone());
//! let jar = runner.download("modrinth", "1.20.1", &metadata).await?;
//! ```

mod filter;
mod provider;
mod registry;
mod runner;
mod source;

pub use filter::NameFilter;
pub use provider::{
    CapabilityKind, DownloadCapability, DownloadRequest, GenerateCapability, Metadata, Provider,
    metadata_as, metadata_from,
};
pub use registry::{Diagnostic, Discovery, ProviderRegistry, RegisteredProvider, Severity};
pub use runner::ProviderRunner;
pub use source::ProviderSource;
