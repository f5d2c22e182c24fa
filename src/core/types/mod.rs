use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Veo,
    Sora2,
    Jimeng,
    Keling,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Veo,
        ProviderId::Sora2,
        ProviderId::Jimeng,
        ProviderId::Keling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo => "veo",
            Self::Sora2 => "sora2",
            Self::Jimeng => "jimeng",
            Self::Keling => "keling",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "veo" => Ok(Self::Veo),
            "sora2" | "sora" => Ok(Self::Sora2),
            "jimeng" => Ok(Self::Jimeng),
            "keling" | "kling" => Ok(Self::Keling),
            _ => Err(ConfigError::UnsupportedProvider {
                provider: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "4k")]
    Uhd4k,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::Hd1080 => "1080p",
            Self::Uhd4k => "4k",
        }
    }
}

/// Provider-agnostic description of one generation job.
///
/// `provider` and `api_key` steer dispatch and are never part of a wire
/// payload. Every other optional field is omitted from the payload when unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoRequest {
    pub provider: Option<ProviderId>,
    pub api_key: Option<String>,
    pub prompt: String,
    pub model: Option<String>,
    pub duration_seconds: Option<u32>,
    pub aspect_ratio: Option<String>,
    pub resolution: Option<Resolution>,
    pub seed: Option<u64>,
    pub webhook_url: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    pub negative_prompt: Option<String>,
    pub guidance_scale: Option<f64>,
    pub frames_per_second: Option<u32>,
    pub user: Option<String>,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_guidance_scale(mut self, scale: f64) -> Self {
        self.guidance_scale = Some(scale);
        self
    }

    pub fn with_frames_per_second(mut self, fps: u32) -> Self {
        self.frames_per_second = Some(fps);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Queued,
    Processing,
    Streaming,
    Succeeded,
    Failed,
}

impl GenerationStatus {
    /// `Succeeded` and `Failed` end polling; everything else keeps it going.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestIdSource {
    /// Issued by the provider; safe to use as a status key.
    Provider,
    /// Generated locally because the provider payload carried no id. The
    /// provider does not know this value.
    Synthesized,
}

/// Partial result produced by a response mapper. Every field may be absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedResponse {
    pub request_id: Option<String>,
    pub status: Option<GenerationStatus>,
    pub progress: Option<f64>,
    pub eta_seconds: Option<f64>,
    pub video_url: Option<String>,
    pub cover_url: Option<String>,
    pub error_message: Option<String>,
}

impl NormalizedResponse {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub request_id: String,
    pub request_id_source: RequestIdSource,
    pub provider: ProviderId,
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub raw_response: Value,
}

impl GenerationResult {
    /// Assembles a result from a mapper's partial answer.
    ///
    /// The provider always comes from the dispatching adapter. A missing id is
    /// replaced with a random UUID flagged as `Synthesized`, and a missing
    /// status defaults to `Processing`.
    pub fn from_normalized(
        provider: ProviderId,
        normalized: NormalizedResponse,
        raw_response: Value,
    ) -> Self {
        let (request_id, request_id_source) = match normalized.request_id {
            Some(request_id) => (request_id, RequestIdSource::Provider),
            None => (
                uuid::Uuid::new_v4().to_string(),
                RequestIdSource::Synthesized,
            ),
        };

        Self {
            request_id,
            request_id_source,
            provider,
            status: normalized.status.unwrap_or(GenerationStatus::Processing),
            progress: normalized.progress,
            eta_seconds: normalized.eta_seconds,
            video_url: normalized.video_url,
            cover_url: normalized.cover_url,
            error_message: normalized.error_message,
            raw_response,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_provider_request_id(&self) -> bool {
        self.request_id_source == RequestIdSource::Provider
    }
}

/// Per-provider runtime settings supplied once at client construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub extra_headers: BTreeMap<String, String>,
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Per-call overrides for `poll_until_done`. Unset fields fall back to the
/// client defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollOptions {
    pub poll_interval: Option<Duration>,
    pub max_poll_time: Option<Duration>,
    pub api_key: Option<String>,
}

impl PollOptions {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_max_poll_time(mut self, max_poll_time: Duration) -> Self {
        self.max_poll_time = Some(max_poll_time);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
