//! Provider registry.
//!
//! The registry is built once per process from a list of [`ProviderSource`]s
//! and keeps two indexes:
//!
//! 1. provider id → [`RegisteredProvider`] (instance, source, offered kinds)
//! 2. [`CapabilityKind`] → ids offering it, in registration order
//!
//! Index 2 is only ever written from index 1, so the two cannot disagree.
//! Discovery never fails as a whole: misbehaving sources and providers are
//! reported as [`Diagnostic`]s and skipped.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::provider::{CapabilityKind, Provider};
use super::source::ProviderSource;

/// A provider instance together with what the registry learned about it.
#[derive(Clone)]
pub struct RegisteredProvider {
    instance: Arc<dyn Provider>,
    source: String,
    kinds: Vec<CapabilityKind>,
}

impl RegisteredProvider {
    /// The provider instance.
    #[must_use]
    pub fn instance(&self) -> &Arc<dyn Provider> {
        &self.instance
    }

    /// Name of the source the provider was discovered in.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Capability kinds offered by the provider.
    #[must_use]
    pub fn kinds(&self) -> &[CapabilityKind] {
        &self.kinds
    }

    /// Whether the provider offers `kind`.
    #[must_use]
    pub fn offers(&self, kind: CapabilityKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl std::fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("id", &self.instance.id())
            .field("source", &self.source)
            .field("kinds", &self.kinds)
            .finish()
    }
}

/// How serious a discovery finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Registration continued normally.
    Warning,
    /// Something was skipped.
    Error,
}

/// A non-fatal finding from registry discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The source defines no providers at all.
    NoProviders {
        /// Source name.
        source: String,
    },
    /// The source defines more than one provider (all are registered).
    MultipleProviders {
        /// Source name.
        source: String,
        /// Number of providers defined.
        count: usize,
    },
    /// A provider factory failed; the provider was skipped.
    ConstructionFailed {
        /// Source name.
        source: String,
        /// Error message from the factory.
        message: String,
    },
    /// A provider reported an empty id; it was skipped.
    InvalidId {
        /// Source name.
        source: String,
    },
    /// A provider offers no capability; it is registered but unreachable.
    NoCapabilities {
        /// Source name.
        source: String,
        /// Provider id.
        id: String,
    },
    /// A later registration replaced an earlier provider with the same id.
    Replaced {
        /// Provider id.
        id: String,
        /// Source of the replaced provider.
        previous_source: String,
        /// Source of the new provider.
        source: String,
    },
}

impl Diagnostic {
    /// Severity of this finding.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::ConstructionFailed { .. } | Self::InvalidId { .. } => Severity::Error,
            Self::NoProviders { .. }
            | Self::MultipleProviders { .. }
            | Self::NoCapabilities { .. }
            | Self::Replaced { .. } => Severity::Warning,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProviders { source } => write!(
                f,
                "Could not find a mod provider in '{source}'. Maybe it is missing a provider definition?"
            ),
            Self::MultipleProviders { source, count } => write!(
                f,
                "'{source}' defines {count} mod providers. The recommended limit is one per source."
            ),
            Self::ConstructionFailed { source, message } => {
                write!(f, "A mod provider in '{source}' failed to initialize: {message}")
            }
            Self::InvalidId { source } => {
                write!(f, "A mod provider in '{source}' has an empty id and was skipped")
            }
            Self::NoCapabilities { source, id } => write!(
                f,
                "Mod provider '{id}' from '{source}' offers no download or generate handler"
            ),
            Self::Replaced {
                id,
                previous_source,
                source,
            } => write!(
                f,
                "Mod provider '{id}' from '{source}' replaces the one from '{previous_source}'"
            ),
        }
    }
}

/// Registry plus everything reported while building it.
#[derive(Debug)]
pub struct Discovery {
    /// The populated registry.
    pub registry: ProviderRegistry,
    /// Findings, in the order they occurred.
    pub diagnostics: Vec<Diagnostic>,
}

/// Registry of mod providers.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Providers indexed by id.
    providers: HashMap<String, RegisteredProvider>,
    /// Provider ids indexed by the capability they offer.
    by_kind: BTreeMap<CapabilityKind, Vec<String>>,
    /// Registration order, for stable listings.
    order: Vec<String>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from provider sources.
    ///
    /// Every diagnostic is logged as it happens and also returned.
    pub fn discover(sources: impl IntoIterator<Item = ProviderSource>) -> Discovery {
        let mut registry = Self::new();
        let mut diagnostics = Vec::new();

        for source in sources {
            registry.load_source(&source, &mut diagnostics);
        }

        debug!(providers = ?registry.ids(), "Provider discovery finished");
        Discovery {
            registry,
            diagnostics,
        }
    }

    fn load_source(&mut self, source: &ProviderSource, diagnostics: &mut Vec<Diagnostic>) {
        let mut report = |diagnostic: Diagnostic| {
            match diagnostic.severity() {
                Severity::Warning => warn!(source = source.name(), "{diagnostic}"),
                Severity::Error => error!(source = source.name(), "{diagnostic}"),
            }
            diagnostics.push(diagnostic);
        };

        match source.len() {
            0 => report(Diagnostic::NoProviders {
                source: source.name().to_string(),
            }),
            1 => {}
            count => report(Diagnostic::MultipleProviders {
                source: source.name().to_string(),
                count,
            }),
        }

        for built in source.instantiate() {
            let instance = match built {
                Ok(instance) => instance,
                Err(e) => {
                    report(Diagnostic::ConstructionFailed {
                        source: source.name().to_string(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let id = instance.id().trim().to_string();
            if id.is_empty() {
                report(Diagnostic::InvalidId {
                    source: source.name().to_string(),
                });
                continue;
            }

            if instance.capabilities().is_empty() {
                report(Diagnostic::NoCapabilities {
                    source: source.name().to_string(),
                    id: id.clone(),
                });
            }

            if let Some(previous) = self.insert(id.clone(), source.name(), instance) {
                report(Diagnostic::Replaced {
                    id,
                    previous_source: previous.source,
                    source: source.name().to_string(),
                });
            }
        }
    }

    /// Register a single provider under its own id.
    ///
    /// If a provider with the same id already exists it is replaced and
    /// returned.
    pub fn register<P: Provider>(&mut self, source: &str, provider: P) -> Option<RegisteredProvider> {
        let id = provider.id().trim().to_string();
        self.insert(id, source, Arc::new(provider))
    }

    fn insert(
        &mut self,
        id: String,
        source: &str,
        instance: Arc<dyn Provider>,
    ) -> Option<RegisteredProvider> {
        let previous = self.providers.remove(&id);
        if previous.is_some() {
            for ids in self.by_kind.values_mut() {
                ids.retain(|existing| existing != &id);
            }
            self.order.retain(|existing| existing != &id);
        }

        let kinds = instance.capabilities();
        for kind in &kinds {
            self.by_kind.entry(*kind).or_default().push(id.clone());
        }
        debug!(%id, %source, ?kinds, "Registered mod provider");

        self.order.push(id.clone());
        self.providers.insert(
            id,
            RegisteredProvider {
                instance,
                source: source.to_string(),
                kinds,
            },
        );
        previous
    }

    /// Get a provider by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RegisteredProvider> {
        self.providers.get(id)
    }

    /// Ids of providers offering `kind`, in registration order.
    #[must_use]
    pub fn ids_for(&self, kind: CapabilityKind) -> &[String] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// All provider ids, in registration order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Iterate over providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredProvider> {
        self.order.iter().filter_map(|id| self.providers.get(id))
    }

    /// Get the number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.order)
            .field("by_kind", &self.by_kind)
            .finish()
    }
}
