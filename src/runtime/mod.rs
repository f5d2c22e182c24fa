use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::core::error::{ConfigError, RuntimeError};
use crate::core::traits::VideoProviderAdapter;
use crate::core::types::{
    GenerationResult, PollOptions, ProviderConfig, ProviderId, VideoRequest,
};
use crate::registry::ProviderRegistry;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);
pub const DEFAULT_MAX_POLL_TIME: Duration = Duration::from_secs(5 * 60);

type AdapterCache = HashMap<ProviderId, Arc<dyn VideoProviderAdapter>>;

/// Entry point for starting video jobs and waiting on them.
///
/// Adapters are created lazily per provider and cached for the life of the
/// client. The cache is the only shared mutable state.
pub struct VideoGenerationClient {
    registry: ProviderRegistry,
    provider_configs: BTreeMap<ProviderId, ProviderConfig>,
    default_provider: Option<ProviderId>,
    adapters: RwLock<AdapterCache>,
    poll_interval: Duration,
    max_poll_time: Option<Duration>,
}

pub struct VideoGenerationClientBuilder {
    registry: ProviderRegistry,
    provider_configs: BTreeMap<ProviderId, ProviderConfig>,
    default_provider: Option<ProviderId>,
    adapters: AdapterCache,
    poll_interval: Duration,
    max_poll_time: Option<Duration>,
}

impl VideoGenerationClient {
    pub fn builder() -> VideoGenerationClientBuilder {
        VideoGenerationClientBuilder {
            registry: ProviderRegistry::builtin(),
            provider_configs: BTreeMap::new(),
            default_provider: None,
            adapters: HashMap::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_time: Some(DEFAULT_MAX_POLL_TIME),
        }
    }

    pub fn default_provider(&self) -> Option<ProviderId> {
        self.default_provider
    }

    /// Starts a generation job on the request's provider, or the client
    /// default when the request names none.
    pub async fn generate(&self, request: &VideoRequest) -> Result<GenerationResult, RuntimeError> {
        let provider = self.resolve_provider(request.provider)?;
        let adapter = self.adapter(provider)?;

        let result = adapter
            .start_generation(request, request.api_key.as_deref())
            .await?;

        tracing::debug!(
            provider = %provider,
            request_id = %result.request_id,
            status = ?result.status,
            "started video generation"
        );

        Ok(result)
    }

    /// Single status check without the polling loop.
    pub async fn status(
        &self,
        request_id: &str,
        provider: Option<ProviderId>,
        api_key: Option<&str>,
    ) -> Result<GenerationResult, RuntimeError> {
        let provider = self.resolve_provider(provider)?;
        let adapter = self.adapter(provider)?;

        Ok(adapter.get_status(request_id, api_key).await?)
    }

    /// Polls until the job reports `Succeeded` or `Failed`.
    ///
    /// The first check happens immediately; the interval is slept between
    /// checks. When the deadline passes after a non-terminal answer the call
    /// fails with `PollTimeout` and that answer is dropped.
    pub async fn poll_until_done(
        &self,
        request_id: &str,
        provider: Option<ProviderId>,
        options: PollOptions,
    ) -> Result<GenerationResult, RuntimeError> {
        let provider = self.resolve_provider(provider)?;
        let adapter = self.adapter(provider)?;
        let interval = options.poll_interval.unwrap_or(self.poll_interval);
        let max_poll_time = options.max_poll_time.or(self.max_poll_time);
        if interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval.into());
        }

        let started_at = Instant::now();
        loop {
            let result = adapter
                .get_status(request_id, options.api_key.as_deref())
                .await?;
            if result.is_terminal() {
                return Ok(result);
            }

            let elapsed = started_at.elapsed();
            tracing::debug!(
                provider = %provider,
                request_id,
                status = ?result.status,
                progress = ?result.progress,
                elapsed_ms = elapsed.as_millis() as u64,
                "polling video generation"
            );

            if let Some(max_poll_time) = max_poll_time {
                if elapsed > max_poll_time {
                    return Err(RuntimeError::PollTimeout {
                        provider,
                        request_id: request_id.to_string(),
                        elapsed_ms: elapsed.as_millis() as u64,
                        max_poll_time_ms: max_poll_time.as_millis() as u64,
                    });
                }
            }

            tokio::time::sleep(interval).await;
        }
    }

    /// Returns the cached adapter for `provider`, creating it on first use.
    pub fn adapter(
        &self,
        provider: ProviderId,
    ) -> Result<Arc<dyn VideoProviderAdapter>, RuntimeError> {
        if let Some(adapter) = self.read_adapters().get(&provider) {
            return Ok(Arc::clone(adapter));
        }

        let config = self
            .provider_configs
            .get(&provider)
            .cloned()
            .unwrap_or_default();
        let created = self.registry.create_provider(provider, config)?;

        let mut adapters = self
            .adapters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let adapter = adapters.entry(provider).or_insert_with(|| {
            tracing::debug!(provider = %provider, "created provider adapter");
            created
        });

        Ok(Arc::clone(adapter))
    }

    fn resolve_provider(&self, provider: Option<ProviderId>) -> Result<ProviderId, ConfigError> {
        provider
            .or(self.default_provider)
            .ok_or(ConfigError::MissingProvider)
    }

    fn read_adapters(&self) -> std::sync::RwLockReadGuard<'_, AdapterCache> {
        self.adapters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VideoGenerationClientBuilder {
    pub fn with_default_provider(mut self, provider: ProviderId) -> Self {
        self.default_provider = Some(provider);
        self
    }

    pub fn with_provider_config(mut self, provider: ProviderId, config: ProviderConfig) -> Self {
        self.provider_configs.insert(provider, config);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// `None` polls until a terminal status with no deadline.
    pub fn with_max_poll_time(mut self, max_poll_time: Option<Duration>) -> Self {
        self.max_poll_time = max_poll_time;
        self
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Pre-seeds the adapter cache, bypassing the registry for this provider.
    pub fn with_adapter(mut self, adapter: Arc<dyn VideoProviderAdapter>) -> Self {
        self.adapters.insert(adapter.id(), adapter);
        self
    }

    pub fn build(self) -> VideoGenerationClient {
        VideoGenerationClient {
            registry: self.registry,
            provider_configs: self.provider_configs,
            default_provider: self.default_provider,
            adapters: RwLock::new(self.adapters),
            poll_interval: self.poll_interval,
            max_poll_time: self.max_poll_time,
        }
    }
}

#[cfg(test)]
mod tests;
