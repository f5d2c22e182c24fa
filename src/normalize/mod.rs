//! Mapping of arbitrary provider JSON onto the unified result vocabulary.
//!
//! Nothing here fails: unexpected shapes degrade to absent fields so a
//! malformed intermediate update never aborts a polling loop.

use serde_json::Value;

use crate::core::types::{GenerationStatus, NormalizedResponse};

/// Candidate locations per unified field, tried in order. Entries are JSON
/// pointers so nested keys sit in the same table as top-level ones.
pub const REQUEST_ID_KEYS: &[&str] = &["/id", "/request_id", "/task_id"];
pub const STATUS_KEYS: &[&str] = &["/status", "/state", "/phase"];
pub const PROGRESS_KEYS: &[&str] = &["/progress", "/percent", "/percentage"];
pub const ETA_KEYS: &[&str] = &["/eta_seconds"];
pub const VIDEO_URL_KEYS: &[&str] = &["/video_url", "/output/video_url"];
pub const COVER_URL_KEYS: &[&str] = &["/cover_url", "/thumbnail", "/preview"];
pub const ERROR_KEYS: &[&str] = &["/error"];

const QUEUED: &[&str] = &["queued", "pending", "waiting"];
const PROCESSING: &[&str] = &["processing", "running", "working"];
const STREAMING: &[&str] = &["streaming", "generating"];
const SUCCEEDED: &[&str] = &["succeeded", "success", "completed", "done"];
const FAILED: &[&str] = &["failed", "error", "canceled", "cancelled"];

/// Maps a provider status word onto the unified vocabulary.
///
/// Matching is case-insensitive. Unknown or absent values map to
/// `Processing` so that polling continues.
pub fn normalize_status(raw: Option<&str>) -> GenerationStatus {
    let Some(raw) = raw else {
        return GenerationStatus::Processing;
    };

    let lowered = raw.trim().to_ascii_lowercase();
    let word = lowered.as_str();
    if QUEUED.contains(&word) {
        GenerationStatus::Queued
    } else if PROCESSING.contains(&word) {
        GenerationStatus::Processing
    } else if STREAMING.contains(&word) {
        GenerationStatus::Streaming
    } else if SUCCEEDED.contains(&word) {
        GenerationStatus::Succeeded
    } else if FAILED.contains(&word) {
        GenerationStatus::Failed
    } else {
        GenerationStatus::Processing
    }
}

/// Values above 1 are percentages; anything else is already a fraction.
pub fn normalize_progress(value: f64) -> f64 {
    if value > 1.0 { value / 100.0 } else { value }
}

/// Generic normalizer used when a provider spec has no response mapper.
///
/// `null` yields an empty response. Any other payload gets a status (the
/// `Processing` default when no status key is present).
pub fn normalize_response(payload: &Value) -> NormalizedResponse {
    if payload.is_null() {
        return NormalizedResponse::default();
    }

    NormalizedResponse {
        request_id: probe_id(payload, REQUEST_ID_KEYS),
        status: Some(normalize_status(
            probe_str(payload, STATUS_KEYS).as_deref(),
        )),
        progress: probe_f64(payload, PROGRESS_KEYS).map(normalize_progress),
        eta_seconds: probe_f64(payload, ETA_KEYS),
        video_url: probe_str(payload, VIDEO_URL_KEYS),
        cover_url: probe_str(payload, COVER_URL_KEYS),
        error_message: probe_error(payload, ERROR_KEYS),
    }
}

/// First string found at any of `pointers`.
pub fn probe_str(payload: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .find_map(|value| value.as_str().map(str::to_string))
}

/// Like [`probe_str`], but numeric ids are accepted and rendered as strings.
pub fn probe_id(payload: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .find_map(|value| match value {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
}

/// First finite number found at any of `pointers`; numeric strings count.
pub fn probe_f64(payload: &Value, pointers: &[&str]) -> Option<f64> {
    pointers
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .find_map(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|value| value.is_finite())
}

/// Error text given either as a plain string or as `{ "message": ... }`.
pub fn probe_error(payload: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .find_map(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Object(fields) => fields
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}
