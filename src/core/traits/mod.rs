use async_trait::async_trait;

use crate::core::error::ProviderError;
use crate::core::types::{GenerationResult, ProviderId, VideoRequest};

/// Adapter contract binding one provider to the unified request/result model.
///
/// Implementations own transport and field mapping. Every returned result must
/// carry `id()` as its provider, whatever the remote payload says.
#[async_trait]
pub trait VideoProviderAdapter: Send + Sync {
    /// Provider this adapter dispatches to.
    fn id(&self) -> ProviderId;

    /// Submits a new generation job.
    ///
    /// The credential is resolved as `api_key_override`, then
    /// `request.api_key`, then the adapter's configured key.
    async fn start_generation(
        &self,
        request: &VideoRequest,
        api_key_override: Option<&str>,
    ) -> Result<GenerationResult, ProviderError>;

    /// Fetches the current state of a previously started job.
    async fn get_status(
        &self,
        request_id: &str,
        api_key_override: Option<&str>,
    ) -> Result<GenerationResult, ProviderError>;
}
