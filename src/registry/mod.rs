use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::error::ConfigError;
use crate::core::traits::VideoProviderAdapter;
use crate::core::types::{ProviderConfig, ProviderId};
use crate::providers::{HttpProviderAdapter, ProviderSpec, jimeng, keling, sora, veo};
use crate::transport::http::HttpTransport;

/// Specs for every built-in provider, in registry order.
pub fn builtin_specs() -> Vec<ProviderSpec> {
    vec![veo::spec(), sora::spec(), jimeng::spec(), keling::spec()]
}

/// Table of provider specs plus the transport adapters are built with.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    specs: IndexMap<ProviderId, ProviderSpec>,
    transport: HttpTransport,
}

impl ProviderRegistry {
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for spec in builtin_specs() {
            registry.register(spec);
        }
        registry
    }

    /// A registry with no providers; every lookup fails until specs are
    /// registered.
    pub fn empty() -> Self {
        Self {
            specs: IndexMap::new(),
            transport: HttpTransport::default(),
        }
    }

    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Adds a spec, replacing any existing spec for the same provider in
    /// place.
    pub fn register(&mut self, spec: ProviderSpec) {
        self.specs.insert(spec.id, spec);
    }

    pub fn spec(&self, provider: ProviderId) -> Option<&ProviderSpec> {
        self.specs.get(&provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.specs.keys().copied()
    }

    /// Instantiates an adapter. Never falls back to another provider.
    pub fn create_provider(
        &self,
        provider: ProviderId,
        config: ProviderConfig,
    ) -> Result<Arc<dyn VideoProviderAdapter>, ConfigError> {
        let spec = self
            .spec(provider)
            .cloned()
            .ok_or_else(|| ConfigError::UnsupportedProvider {
                provider: provider.to_string(),
            })?;

        Ok(Arc::new(HttpProviderAdapter::with_transport(
            spec,
            config,
            self.transport.clone(),
        )))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builds an adapter for a built-in provider.
pub fn create_provider(
    provider: ProviderId,
    config: ProviderConfig,
) -> Result<Arc<dyn VideoProviderAdapter>, ConfigError> {
    ProviderRegistry::builtin().create_provider(provider, config)
}
