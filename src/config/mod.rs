//! Opt-in helpers that build a [`ProviderConfig`] from environment variables.
//!
//! The client never reads the environment itself; call these explicitly and
//! hand the result to `VideoGenerationClientBuilder::with_provider_config`.

use crate::core::types::{ProviderConfig, ProviderId};

/// API key variables checked for `provider`, most specific first.
pub fn api_key_env_candidates(provider: ProviderId) -> &'static [&'static str] {
    match provider {
        ProviderId::Veo => &["VEO_API_KEY", "GOOGLE_ACCESS_TOKEN"],
        ProviderId::Sora2 => &["SORA2_API_KEY", "OPENAI_API_KEY"],
        ProviderId::Jimeng => &["JIMENG_API_KEY", "DASHSCOPE_API_KEY"],
        ProviderId::Keling => &["KELING_API_KEY", "KLING_API_KEY"],
    }
}

fn env_prefix(provider: ProviderId) -> String {
    provider.as_str().to_ascii_uppercase()
}

pub fn provider_config_from_env(provider: ProviderId) -> ProviderConfig {
    provider_config_from_lookup(provider, |name| std::env::var(name).ok())
}

/// Same as [`provider_config_from_env`] with a caller-supplied variable
/// source. Blank values count as unset.
pub fn provider_config_from_lookup<F>(provider: ProviderId, lookup: F) -> ProviderConfig
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let prefix = env_prefix(provider);

    ProviderConfig {
        api_key: api_key_env_candidates(provider)
            .iter()
            .find_map(|name| read(name)),
        base_url: read(&format!("{prefix}_BASE_URL")),
        extra_headers: Default::default(),
        model: read(&format!("{prefix}_MODEL")),
    }
}
