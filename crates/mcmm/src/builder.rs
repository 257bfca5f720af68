//! Builder for configuring mcmm.
//!
//! The [`McmmBuilder`] collects the provider sources the CLI discovers
//! providers from.
//!
//! # Example
//!
//! ```no_run
//! use mcmm::Mcmm;
//!
//! let mcmm = Mcmm::builder()
//!     .with_defaults()
//!     // .with_source(my_provider::source())
//!     .build();
//! # let _ = mcmm;
//! ```

use mcmm_core::providers::ProviderSource;

use crate::Mcmm;

/// Builder for configuring and creating a [`Mcmm`] instance.
///
/// Use [`Mcmm::builder()`] to create a new builder.
#[derive(Debug)]
pub struct McmmBuilder {
    sources: Vec<ProviderSource>,
}

impl McmmBuilder {
    /// Create a new builder without any provider source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a provider source. Sources are discovered in the order added, so
    /// a later source can replace an earlier provider by reusing its id.
    #[must_use]
    pub fn with_source(mut self, source: ProviderSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add the built-in sources (file, modrinth, github, curse_forge).
    #[must_use]
    pub fn with_defaults(self) -> Self {
        self.with_source(mcmm_provider_file::source())
            .with_source(mcmm_provider_modrinth::source())
            .with_source(mcmm_provider_github::source())
            .with_source(mcmm_provider_curseforge::source())
    }

    /// Build the [`Mcmm`] instance.
    #[must_use]
    pub fn build(self) -> Mcmm {
        Mcmm {
            sources: self.sources,
        }
    }
}

impl Default for McmmBuilder {
    fn default() -> Self {
        Self::new()
    }
}
