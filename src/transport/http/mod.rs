use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde_json::Value;

use crate::core::error::{ConfigError, ProviderError};
use crate::core::types::ProviderId;

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Headers attached to one outbound call.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders<'a> {
    /// Applied first; later layers override them.
    pub defaults: &'a [(&'static str, &'static str)],
    pub extra: Option<&'a BTreeMap<String, String>>,
    /// Full `Authorization` value, always applied last.
    pub authorization: Option<&'a str>,
}

/// One request/response exchange per call. No retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::with_client(reqwest::Client::new(), timeout_ms)
    }

    pub fn with_client(client: reqwest::Client, timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::validate_timeout(timeout_ms)?;

        Ok(Self { client, timeout_ms })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub async fn get_json(
        &self,
        provider: ProviderId,
        base_url: &str,
        path: &str,
        headers: &RequestHeaders<'_>,
    ) -> Result<Value, ProviderError> {
        self.execute(provider, Method::GET, base_url, path, None, headers)
            .await
    }

    pub async fn post_json(
        &self,
        provider: ProviderId,
        base_url: &str,
        path: &str,
        body: &Value,
        headers: &RequestHeaders<'_>,
    ) -> Result<Value, ProviderError> {
        let payload = serde_json::to_vec(body).map_err(|error| ProviderError::Serialization {
            provider,
            request_id: None,
            message: error.to_string(),
        })?;

        self.execute(provider, Method::POST, base_url, path, Some(payload), headers)
            .await
    }

    /// Sends the request and returns the body: parsed JSON when the response
    /// declares a JSON content type, otherwise the raw text as a string value.
    async fn execute(
        &self,
        provider: ProviderId,
        method: Method,
        base_url: &str,
        path: &str,
        body: Option<Vec<u8>>,
        headers: &RequestHeaders<'_>,
    ) -> Result<Value, ProviderError> {
        let header_map = build_header_map(provider, headers)?;
        let url = join_url(base_url, path);

        tracing::debug!(provider = %provider, method = %method, path, "sending provider request");

        let mut request_builder = self
            .client
            .request(method.clone(), &url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .headers(header_map);
        if let Some(payload) = body {
            request_builder = request_builder.body(payload);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|error| ProviderError::Transport {
                provider,
                method: method.to_string(),
                path: path.to_string(),
                message: error.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(build_status_error(provider, &method, path, response).await);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"));

        if is_json {
            response
                .json::<Value>()
                .await
                .map_err(|error| ProviderError::Serialization {
                    provider,
                    request_id: None,
                    message: error.to_string(),
                })
        } else {
            response
                .text()
                .await
                .map(Value::String)
                .map_err(|error| ProviderError::Transport {
                    provider,
                    method: method.to_string(),
                    path: path.to_string(),
                    message: format!("failed to read response body: {error}"),
                })
        }
    }

    fn validate_timeout(timeout_ms: u64) -> Result<(), ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout { timeout_ms });
        }
        Ok(())
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

async fn build_status_error(
    provider: ProviderId,
    method: &Method,
    path: &str,
    response: Response,
) -> ProviderError {
    let status_code = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(error) => format!("failed to read response body: {error}"),
    };

    ProviderError::Status {
        provider,
        method: method.to_string(),
        path: path.to_string(),
        status_code,
        body,
    }
}

fn build_header_map(
    provider: ProviderId,
    headers: &RequestHeaders<'_>,
) -> Result<HeaderMap, ProviderError> {
    let mut header_map = HeaderMap::new();
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in headers.defaults {
        header_map.insert(
            parse_header_name(name, provider)?,
            parse_header_value(name, value, provider)?,
        );
    }

    if let Some(extra) = headers.extra {
        for (name, value) in extra {
            header_map.insert(
                parse_header_name(name, provider)?,
                parse_header_value(name, value, provider)?,
            );
        }
    }

    if let Some(authorization) = headers.authorization {
        header_map.insert(
            AUTHORIZATION,
            parse_header_value("authorization", authorization, provider)?,
        );
    }

    Ok(header_map)
}

fn parse_header_name(value: &str, provider: ProviderId) -> Result<HeaderName, ProviderError> {
    HeaderName::from_bytes(value.as_bytes()).map_err(|error| ProviderError::Protocol {
        provider,
        message: format!("invalid header name: {value}: {error}"),
    })
}

fn parse_header_value(
    name: &str,
    value: &str,
    provider: ProviderId,
) -> Result<HeaderValue, ProviderError> {
    HeaderValue::from_str(value).map_err(|error| ProviderError::Protocol {
        provider,
        message: format!("invalid header value for {name}: {error}"),
    })
}

/// Joins a base URL and an absolute path (which may carry a query string).
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
