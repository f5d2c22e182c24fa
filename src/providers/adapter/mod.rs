use std::borrow::Cow;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::ProviderError;
use crate::core::traits::VideoProviderAdapter;
use crate::core::types::{GenerationResult, ProviderConfig, ProviderId, VideoRequest};
use crate::normalize::normalize_response;
use crate::providers::spec::{ProviderSpec, default_map_request};
use crate::transport::http::{HttpTransport, RequestHeaders};

/// Generic adapter: one [`ProviderSpec`] bound to one [`ProviderConfig`],
/// talking to the provider through [`HttpTransport`].
pub struct HttpProviderAdapter {
    spec: ProviderSpec,
    transport: HttpTransport,
    base_url: String,
    api_key: Option<String>,
    extra_headers: BTreeMap<String, String>,
    default_model: Option<String>,
}

impl HttpProviderAdapter {
    pub fn new(spec: ProviderSpec, config: ProviderConfig) -> Self {
        Self::with_transport(spec, config, HttpTransport::default())
    }

    pub fn with_transport(
        spec: ProviderSpec,
        config: ProviderConfig,
        transport: HttpTransport,
    ) -> Self {
        let base_url = normalize_base_url(config.base_url, &spec.base_url);

        Self {
            base_url,
            api_key: sanitize(config.api_key),
            extra_headers: config.extra_headers,
            default_model: sanitize(config.model),
            transport,
            spec,
        }
    }

    pub fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve_api_key(&self, candidates: &[Option<&str>]) -> Result<String, ProviderError> {
        candidates
            .iter()
            .flatten()
            .map(|key| key.trim())
            .find(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| self.api_key.clone())
            .ok_or(ProviderError::CredentialMissing {
                provider: self.spec.id,
            })
    }

    fn headers<'a>(&'a self, authorization: &'a str) -> RequestHeaders<'a> {
        RequestHeaders {
            defaults: self.spec.default_headers,
            extra: Some(&self.extra_headers),
            authorization: Some(authorization),
        }
    }

    fn map_request(&self, request: &VideoRequest) -> Result<Value, ProviderError> {
        let request = match (&request.model, &self.default_model) {
            (None, Some(model)) => {
                let mut with_model = request.clone();
                with_model.model = Some(model.clone());
                Cow::Owned(with_model)
            }
            _ => Cow::Borrowed(request),
        };

        let mapped = match &self.spec.map_request {
            Some(mapper) => mapper(&*request),
            None => default_map_request(&request),
        };

        mapped.map_err(|error| ProviderError::Serialization {
            provider: self.spec.id,
            request_id: None,
            message: error.to_string(),
        })
    }

    fn to_result(&self, raw_response: Value) -> GenerationResult {
        let normalized = match &self.spec.map_response {
            Some(mapper) => mapper(&raw_response),
            None => normalize_response(&raw_response),
        };

        let result = GenerationResult::from_normalized(self.spec.id, normalized, raw_response);
        if !result.has_provider_request_id() {
            tracing::warn!(
                provider = %self.spec.id,
                request_id = %result.request_id,
                "provider response carried no request id; synthesized a local one"
            );
        }
        result
    }
}

#[async_trait]
impl VideoProviderAdapter for HttpProviderAdapter {
    fn id(&self) -> ProviderId {
        self.spec.id
    }

    async fn start_generation(
        &self,
        request: &VideoRequest,
        api_key_override: Option<&str>,
    ) -> Result<GenerationResult, ProviderError> {
        let api_key = self.resolve_api_key(&[api_key_override, request.api_key.as_deref()])?;
        let payload = self.map_request(request)?;
        let authorization = self.spec.authorization_for(&api_key);

        let raw_response = self
            .transport
            .post_json(
                self.spec.id,
                &self.base_url,
                &self.spec.start_path,
                &payload,
                &self.headers(&authorization),
            )
            .await?;

        Ok(self.to_result(raw_response))
    }

    async fn get_status(
        &self,
        request_id: &str,
        api_key_override: Option<&str>,
    ) -> Result<GenerationResult, ProviderError> {
        let api_key = self.resolve_api_key(&[api_key_override])?;
        let path = self.spec.status_path_for(request_id);
        let authorization = self.spec.authorization_for(&api_key);

        let raw_response = self
            .transport
            .get_json(
                self.spec.id,
                &self.base_url,
                &path,
                &self.headers(&authorization),
            )
            .await?;

        Ok(self.to_result(raw_response))
    }
}

fn normalize_base_url(configured: Option<String>, spec_default: &str) -> String {
    let value = sanitize(configured).unwrap_or_else(|| spec_default.to_string());
    value.trim_end_matches('/').to_string()
}

fn sanitize(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
