//! Provider sources: the unit handed to registry discovery.
//!
//! A source is a named bundle of provider factories, typically one per
//! provider crate (`mcmm_provider_modrinth::source()`). Factories take no
//! arguments; a provider that cannot build itself reports an error instead of
//! panicking so that discovery can skip it.

use std::sync::Arc;

use super::provider::Provider;
use crate::error::ProviderError;

type Factory = Box<dyn Fn() -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

/// A named collection of provider factories.
pub struct ProviderSource {
    name: String,
    factories: Vec<Factory>,
}

impl ProviderSource {
    /// Create an empty source.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factories: Vec::new(),
        }
    }

    /// Add a provider built by a fallible constructor.
    #[must_use]
    pub fn with_provider<P, F>(mut self, factory: F) -> Self
    where
        P: Provider,
        F: Fn() -> Result<P, ProviderError> + Send + Sync + 'static,
    {
        self.factories.push(Box::new(move || {
            factory().map(|provider| Arc::new(provider) as Arc<dyn Provider>)
        }));
        self
    }

    /// Add a provider built with [`Default`].
    #[must_use]
    pub fn with_default<P: Provider + Default>(self) -> Self {
        self.with_provider(|| Ok(P::default()))
    }

    /// Source name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of provider definitions in this source.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the source defines no providers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate every provider, in definition order.
    pub(crate) fn instantiate(&self) -> impl Iterator<Item = Result<Arc<dyn Provider>, ProviderError>> + '_ {
        self.factories.iter().map(|factory| factory())
    }
}

impl std::fmt::Debug for ProviderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSource")
            .field("name", &self.name)
            .field("providers", &self.factories.len())
            .finish()
    }
}
