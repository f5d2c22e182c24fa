use crate::core::types::ProviderId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("provider is required; set request.provider or configure a default provider")]
    MissingProvider,
    #[error("unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },
    #[error("invalid timeout: {timeout_ms} ms")]
    InvalidTimeout { timeout_ms: u64 },
    #[error("invalid poll interval: must be greater than zero")]
    InvalidPollInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("missing api key for provider {provider}")]
    CredentialMissing { provider: ProviderId },
    #[error(
        "provider {provider} {method} {path} failed: {status_code} {body}"
    )]
    Status {
        provider: ProviderId,
        method: String,
        path: String,
        status_code: u16,
        body: String,
    },
    #[error(
        "provider transport error{context}: {message}",
        context = format_context(Some(.provider), Some(.method.as_str()), Some(.path.as_str()), None)
    )]
    Transport {
        provider: ProviderId,
        method: String,
        path: String,
        message: String,
    },
    #[error(
        "provider serialization error{context}: {message}",
        context = format_context(Some(.provider), None, None, .request_id.as_deref())
    )]
    Serialization {
        provider: ProviderId,
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider protocol error{context}: {message}",
        context = format_context(Some(.provider), None, None, None)
    )]
    Protocol {
        provider: ProviderId,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    #[error("credential missing [provider={provider}]")]
    CredentialMissing { provider: ProviderId },
    #[error(transparent)]
    ProviderError(ProviderError),
    #[error(
        "polling timed out after {max_poll_time_ms} ms{context} (elapsed {elapsed_ms} ms)",
        context = format_context(Some(.provider), None, None, Some(.request_id.as_str()))
    )]
    PollTimeout {
        provider: ProviderId,
        request_id: String,
        elapsed_ms: u64,
        max_poll_time_ms: u64,
    },
}

impl RuntimeError {
    /// True for failures raised locally before any network call.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError(_) | Self::CredentialMissing { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout { .. })
    }
}

impl From<ProviderError> for RuntimeError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::CredentialMissing { provider } => Self::CredentialMissing { provider },
            other => Self::ProviderError(other),
        }
    }
}

fn format_context(
    provider: Option<&ProviderId>,
    method: Option<&str>,
    path: Option<&str>,
    request_id: Option<&str>,
) -> String {
    let mut context = Vec::new();

    if let Some(provider) = provider {
        context.push(format!("provider={provider}"));
    }
    if let Some(method) = method {
        context.push(format!("method={method}"));
    }
    if let Some(path) = path {
        context.push(format!("path={path}"));
    }
    if let Some(request_id) = request_id {
        context.push(format!("request_id={request_id}"));
    }

    if context.is_empty() {
        String::new()
    } else {
        format!(" [{}]", context.join(", "))
    }
}
