//! OpenAI Sora 2 video API. Uses the generic request mapper and normalizer:
//! the job id is `id`, `status` covers `queued`/`in_progress`/`completed`/
//! `failed`, and `progress` is a 0-100 percentage.

use crate::core::types::ProviderId;
use crate::providers::spec::ProviderSpec;

pub const SORA_DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const SORA_START_PATH: &str = "/v1/videos";

pub fn spec() -> ProviderSpec {
    ProviderSpec::new(
        ProviderId::Sora2,
        SORA_DEFAULT_BASE_URL,
        SORA_START_PATH,
        |request_id| format!("{SORA_START_PATH}/{request_id}"),
    )
}
