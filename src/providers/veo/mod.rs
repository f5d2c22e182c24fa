//! Google Veo on Vertex AI.
//!
//! The default endpoints carry `REGION`, `PROJECT_ID` and `LOCATION`
//! placeholders; integrators override the base URL through `ProviderConfig`
//! or register a spec with real paths.

use serde::Serialize;
use serde_json::Value;

use crate::core::types::{GenerationStatus, NormalizedResponse, ProviderId, VideoRequest};
use crate::normalize::{normalize_progress, probe_error, probe_f64, probe_str};
use crate::providers::spec::ProviderSpec;

pub const VEO_DEFAULT_BASE_URL: &str = "https://REGION-aiplatform.googleapis.com";
pub const VEO_START_PATH: &str =
    "/v1/projects/PROJECT_ID/locations/LOCATION/publishers/google/models/veo-001:predict";
const VEO_OPERATIONS_PREFIX: &str = "/v1/projects/PROJECT_ID/locations/LOCATION/operations";

const VIDEO_URI_KEYS: &[&str] = &[
    "/response/videos/0/gcsUri",
    "/response/videos/0/uri",
    "/response/generatedSamples/0/video/uri",
];
const PROGRESS_KEYS: &[&str] = &["/metadata/progressPercent"];
const ERROR_KEYS: &[&str] = &["/error"];

pub fn spec() -> ProviderSpec {
    ProviderSpec::new(
        ProviderId::Veo,
        VEO_DEFAULT_BASE_URL,
        VEO_START_PATH,
        |request_id| format!("{VEO_OPERATIONS_PREFIX}/{request_id}"),
    )
    .with_request_mapper(map_request)
    .with_response_mapper(map_response)
}

#[derive(Debug, Serialize)]
struct VeoPayload<'a> {
    instances: [VeoInstance<'a>; 1],
    parameters: VeoParameters<'a>,
}

#[derive(Debug, Serialize)]
struct VeoInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_uri: Option<&'a str>,
}

/// Vertex `predict` shape: a single instance plus camelCase parameters. The
/// model lives in the endpoint path, so `request.model` is not sent.
pub fn map_request(request: &VideoRequest) -> Result<Value, serde_json::Error> {
    let storage_uri = request
        .metadata
        .get("storage_uri")
        .and_then(Value::as_str);

    serde_json::to_value(VeoPayload {
        instances: [VeoInstance {
            prompt: &request.prompt,
        }],
        parameters: VeoParameters {
            aspect_ratio: request.aspect_ratio.as_deref(),
            duration_seconds: request.duration_seconds,
            resolution: request.resolution.map(|resolution| resolution.as_str()),
            negative_prompt: request.negative_prompt.as_deref(),
            seed: request.seed,
            fps: request.frames_per_second,
            storage_uri,
        },
    })
}

/// Reads a long-running operation. The job key is the final segment of the
/// operation `name`.
pub fn map_response(payload: &Value) -> NormalizedResponse {
    if payload.is_null() {
        return NormalizedResponse::default();
    }

    let request_id = probe_str(payload, &["/name"]).and_then(|name| {
        name.rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
    });
    let error_message = probe_error(payload, ERROR_KEYS);

    let status = if payload.get("error").is_some_and(|error| !error.is_null()) {
        GenerationStatus::Failed
    } else if payload.get("done").and_then(Value::as_bool) == Some(true) {
        GenerationStatus::Succeeded
    } else {
        GenerationStatus::Processing
    };

    NormalizedResponse {
        request_id,
        status: Some(status),
        progress: probe_f64(payload, PROGRESS_KEYS).map(normalize_progress),
        eta_seconds: None,
        video_url: probe_str(payload, VIDEO_URI_KEYS),
        cover_url: None,
        error_message,
    }
}
