use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::core::types::{NormalizedResponse, ProviderId, Resolution, VideoRequest};

pub type StatusPathFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type AuthHeaderFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type RequestMapperFn =
    Arc<dyn Fn(&VideoRequest) -> Result<Value, serde_json::Error> + Send + Sync>;
pub type ResponseMapperFn = Arc<dyn Fn(&Value) -> NormalizedResponse + Send + Sync>;

/// Static description of one provider: where to send jobs, how to
/// authenticate, and optionally how to reshape payloads.
///
/// `map_request` / `map_response` are strategies checked at call time; when
/// absent the adapter falls back to [`default_map_request`] and
/// [`crate::normalize::normalize_response`].
#[derive(Clone)]
pub struct ProviderSpec {
    pub id: ProviderId,
    pub base_url: String,
    pub start_path: String,
    pub status_path: StatusPathFn,
    pub auth_header: AuthHeaderFn,
    pub default_headers: &'static [(&'static str, &'static str)],
    pub map_request: Option<RequestMapperFn>,
    pub map_response: Option<ResponseMapperFn>,
}

impl ProviderSpec {
    /// Spec with bearer auth and the generic mappers.
    pub fn new(
        id: ProviderId,
        base_url: impl Into<String>,
        start_path: impl Into<String>,
        status_path: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            base_url: base_url.into(),
            start_path: start_path.into(),
            status_path: Arc::new(status_path),
            auth_header: Arc::new(bearer_auth),
            default_headers: &[],
            map_request: None,
            map_response: None,
        }
    }

    pub fn with_auth_header(
        mut self,
        auth_header: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.auth_header = Arc::new(auth_header);
        self
    }

    pub fn with_default_headers(
        mut self,
        headers: &'static [(&'static str, &'static str)],
    ) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn with_request_mapper(
        mut self,
        mapper: impl Fn(&VideoRequest) -> Result<Value, serde_json::Error> + Send + Sync + 'static,
    ) -> Self {
        self.map_request = Some(Arc::new(mapper));
        self
    }

    pub fn with_response_mapper(
        mut self,
        mapper: impl Fn(&Value) -> NormalizedResponse + Send + Sync + 'static,
    ) -> Self {
        self.map_response = Some(Arc::new(mapper));
        self
    }

    pub fn status_path_for(&self, request_id: &str) -> String {
        (self.status_path)(request_id)
    }

    pub fn authorization_for(&self, api_key: &str) -> String {
        (self.auth_header)(api_key)
    }
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("start_path", &self.start_path)
            .field("default_headers", &self.default_headers)
            .field("custom_request_mapper", &self.map_request.is_some())
            .field("custom_response_mapper", &self.map_response.is_some())
            .finish()
    }
}

pub fn bearer_auth(api_key: &str) -> String {
    format!("Bearer {api_key}")
}

#[derive(Debug, Serialize)]
struct DefaultWirePayload<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: &'a BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guidance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

/// Generic one-to-one snake_case mapping. Unset fields are left out of the
/// payload entirely; an empty metadata map counts as unset.
pub fn default_map_request(request: &VideoRequest) -> Result<Value, serde_json::Error> {
    serde_json::to_value(DefaultWirePayload {
        prompt: &request.prompt,
        model: request.model.as_deref(),
        aspect_ratio: request.aspect_ratio.as_deref(),
        resolution: request.resolution,
        duration_seconds: request.duration_seconds,
        seed: request.seed,
        webhook_url: request.webhook_url.as_deref(),
        metadata: &request.metadata,
        negative_prompt: request.negative_prompt.as_deref(),
        guidance_scale: request.guidance_scale,
        fps: request.frames_per_second,
        user: request.user.as_deref(),
    })
}
