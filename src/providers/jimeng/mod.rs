//! Jimeng video models served through Alibaba Cloud DashScope.
//!
//! DashScope wraps task state in `output` and reports its own trace id as
//! the top-level `request_id`; that trace id is not the job key, so this
//! provider ships its own mappers.

use serde::Serialize;
use serde_json::Value;

use crate::core::types::{NormalizedResponse, ProviderId, VideoRequest};
use crate::normalize::{normalize_status, probe_id, probe_str};
use crate::providers::spec::ProviderSpec;

pub const JIMENG_DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com";
pub const JIMENG_START_PATH: &str = "/api/v1/services/aigc/video-generation/generation";

/// DashScope only accepts video jobs in async mode.
const JIMENG_DEFAULT_HEADERS: &[(&str, &str)] = &[("X-DashScope-Async", "enable")];

const TASK_ID_KEYS: &[&str] = &["/output/task_id"];
const TASK_STATUS_KEYS: &[&str] = &["/output/task_status"];
const VIDEO_URL_KEYS: &[&str] = &["/output/video_url"];
const COVER_URL_KEYS: &[&str] = &["/output/cover_image_url"];
const ERROR_KEYS: &[&str] = &["/output/message"];

pub fn spec() -> ProviderSpec {
    ProviderSpec::new(
        ProviderId::Jimeng,
        JIMENG_DEFAULT_BASE_URL,
        JIMENG_START_PATH,
        |request_id| format!("/api/v1/tasks/{request_id}"),
    )
    .with_default_headers(JIMENG_DEFAULT_HEADERS)
    .with_request_mapper(map_request)
    .with_response_mapper(map_response)
}

#[derive(Debug, Serialize)]
struct DashScopePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    input: DashScopeInput<'a>,
    parameters: DashScopeParameters,
}

#[derive(Debug, Serialize)]
struct DashScopeInput<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DashScopeParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

/// Only the fields DashScope understands are forwarded.
pub fn map_request(request: &VideoRequest) -> Result<Value, serde_json::Error> {
    serde_json::to_value(DashScopePayload {
        model: request.model.as_deref(),
        input: DashScopeInput {
            prompt: &request.prompt,
            negative_prompt: request.negative_prompt.as_deref(),
        },
        parameters: DashScopeParameters {
            resolution: request
                .resolution
                .map(|resolution| resolution.as_str().to_ascii_uppercase()),
            duration: request.duration_seconds,
            seed: request.seed,
        },
    })
}

pub fn map_response(payload: &Value) -> NormalizedResponse {
    if payload.is_null() {
        return NormalizedResponse::default();
    }

    NormalizedResponse {
        request_id: probe_id(payload, TASK_ID_KEYS),
        status: Some(normalize_status(
            probe_str(payload, TASK_STATUS_KEYS).as_deref(),
        )),
        progress: None,
        eta_seconds: None,
        video_url: probe_str(payload, VIDEO_URL_KEYS),
        cover_url: probe_str(payload, COVER_URL_KEYS),
        error_message: probe_str(payload, ERROR_KEYS),
    }
}
