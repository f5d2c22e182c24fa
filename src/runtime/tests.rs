use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::core::types::GenerationStatus;
use crate::test_support::{MockResponse, MockServer, ScriptedAdapter};

fn client_with(adapter: Arc<ScriptedAdapter>) -> VideoGenerationClient {
    VideoGenerationClient::builder()
        .with_default_provider(adapter.id())
        .with_adapter(adapter)
        .with_poll_interval(Duration::from_millis(1))
        .build()
}

#[tokio::test]
async fn test_generate_without_any_provider_fails_before_dispatch() {
    let adapter = Arc::new(ScriptedAdapter::new(ProviderId::Sora2, vec![]));
    let client = VideoGenerationClient::builder()
        .with_adapter(adapter.clone())
        .build();

    let result = client.generate(&VideoRequest::new("no provider")).await;

    assert_eq!(
        result,
        Err(RuntimeError::ConfigError(ConfigError::MissingProvider))
    );
    assert_eq!(adapter.start_calls(), 0);
}

#[tokio::test]
async fn test_generate_prefers_request_provider_over_default() {
    let sora = Arc::new(ScriptedAdapter::new(ProviderId::Sora2, vec![]));
    let keling = Arc::new(ScriptedAdapter::new(ProviderId::Keling, vec![]));
    let client = VideoGenerationClient::builder()
        .with_default_provider(ProviderId::Sora2)
        .with_adapter(sora.clone())
        .with_adapter(keling.clone())
        .build();

    let explicit = client
        .generate(&VideoRequest::new("p").with_provider(ProviderId::Keling))
        .await
        .expect("explicit provider should dispatch");
    let defaulted = client
        .generate(&VideoRequest::new("p"))
        .await
        .expect("default provider should dispatch");

    assert_eq!(explicit.provider, ProviderId::Keling);
    assert_eq!(defaulted.provider, ProviderId::Sora2);
    assert_eq!(keling.start_calls(), 1);
    assert_eq!(sora.start_calls(), 1);
}

#[test]
fn test_adapter_cache_returns_identical_instance() {
    let client = VideoGenerationClient::builder()
        .with_provider_config(
            ProviderId::Sora2,
            ProviderConfig::default().with_api_key("k"),
        )
        .build();

    let first = client.adapter(ProviderId::Sora2).expect("first lookup");
    let second = client.adapter(ProviderId::Sora2).expect("second lookup");
    let other = client.adapter(ProviderId::Veo).expect("other provider");

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(other.id(), ProviderId::Veo);
}

#[test]
fn test_adapter_lookup_fails_for_unregistered_provider() {
    let client = VideoGenerationClient::builder()
        .with_registry(ProviderRegistry::empty())
        .build();

    let result = client.adapter(ProviderId::Jimeng);
    assert!(matches!(
        result,
        Err(RuntimeError::ConfigError(ConfigError::UnsupportedProvider { .. }))
    ));
}

#[tokio::test]
async fn test_poll_returns_first_terminal_result_without_extra_polls() {
    let adapter = Arc::new(ScriptedAdapter::new(
        ProviderId::Jimeng,
        vec![
            GenerationStatus::Queued,
            GenerationStatus::Processing,
            GenerationStatus::Streaming,
            GenerationStatus::Succeeded,
            GenerationStatus::Failed,
        ],
    ));
    let client = client_with(adapter.clone());

    let result = client
        .poll_until_done("job-9", None, PollOptions::default())
        .await
        .expect("poll should reach a terminal status");

    assert_eq!(result.status, GenerationStatus::Succeeded);
    assert_eq!(result.request_id, "job-9");
    assert_eq!(result.raw_response, json!({"poll": 4}));
    assert_eq!(adapter.status_calls(), 4);
}

#[tokio::test]
async fn test_poll_stops_on_failed_status() {
    let adapter = Arc::new(ScriptedAdapter::new(
        ProviderId::Veo,
        vec![GenerationStatus::Processing, GenerationStatus::Failed],
    ));
    let client = client_with(adapter.clone());

    let result = client
        .poll_until_done("op-1", Some(ProviderId::Veo), PollOptions::default())
        .await
        .expect("failed status is a terminal result, not an error");

    assert_eq!(result.status, GenerationStatus::Failed);
    assert_eq!(adapter.status_calls(), 2);
}

#[tokio::test]
async fn test_poll_times_out_when_never_terminal() {
    let adapter = Arc::new(ScriptedAdapter::new(
        ProviderId::Sora2,
        vec![GenerationStatus::Processing],
    ));
    let client = client_with(adapter.clone());

    let options = PollOptions::default()
        .with_poll_interval(Duration::from_millis(5))
        .with_max_poll_time(Duration::from_millis(30));
    let result = client.poll_until_done("video_1", None, options).await;

    match result {
        Err(RuntimeError::PollTimeout {
            provider,
            request_id,
            elapsed_ms,
            max_poll_time_ms,
        }) => {
            assert_eq!(provider, ProviderId::Sora2);
            assert_eq!(request_id, "video_1");
            assert_eq!(max_poll_time_ms, 30);
            assert!(elapsed_ms >= 30);
        }
        other => panic!("expected PollTimeout, got {other:?}"),
    }
    assert!(adapter.status_calls() >= 2);
}

#[tokio::test]
async fn test_first_poll_happens_without_waiting_for_interval() {
    let adapter = Arc::new(ScriptedAdapter::new(
        ProviderId::Keling,
        vec![GenerationStatus::Succeeded],
    ));
    let client = VideoGenerationClient::builder()
        .with_default_provider(ProviderId::Keling)
        .with_adapter(adapter.clone())
        .with_poll_interval(Duration::from_secs(3_600))
        .build();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.poll_until_done("t-1", None, PollOptions::default()),
    )
    .await
    .expect("first poll should not sleep")
    .expect("poll should succeed");

    assert_eq!(result.status, GenerationStatus::Succeeded);
    assert_eq!(adapter.status_calls(), 1);
}

#[tokio::test]
async fn test_poll_without_deadline_runs_until_terminal() {
    let mut statuses = vec![GenerationStatus::Processing; 5];
    statuses.push(GenerationStatus::Succeeded);
    let adapter = Arc::new(ScriptedAdapter::new(ProviderId::Sora2, statuses));
    let client = VideoGenerationClient::builder()
        .with_default_provider(ProviderId::Sora2)
        .with_adapter(adapter.clone())
        .with_poll_interval(Duration::from_millis(1))
        .with_max_poll_time(None)
        .build();

    let result = client
        .poll_until_done("video_2", None, PollOptions::default())
        .await
        .expect("poll should succeed");

    assert_eq!(result.status, GenerationStatus::Succeeded);
    assert_eq!(adapter.status_calls(), 6);
}

#[tokio::test]
async fn test_poll_rejects_zero_interval() {
    let adapter = Arc::new(ScriptedAdapter::new(ProviderId::Sora2, vec![]));
    let client = client_with(adapter.clone());

    let result = client
        .poll_until_done(
            "video_3",
            None,
            PollOptions::default().with_poll_interval(Duration::ZERO),
        )
        .await;

    assert_eq!(
        result,
        Err(RuntimeError::ConfigError(ConfigError::InvalidPollInterval))
    );
    assert_eq!(adapter.status_calls(), 0);
}

#[tokio::test]
async fn test_poll_without_provider_fails_with_config_error() {
    let client = VideoGenerationClient::builder().build();

    let result = client
        .poll_until_done("x", None, PollOptions::default())
        .await;

    assert!(result.is_err_and(|error| error.is_config_error()));
}

#[tokio::test]
async fn test_missing_api_key_surfaces_as_credential_error() {
    let client = VideoGenerationClient::builder()
        .with_default_provider(ProviderId::Sora2)
        .build();

    let result = client.generate(&VideoRequest::new("p")).await;

    assert_eq!(
        result,
        Err(RuntimeError::CredentialMissing {
            provider: ProviderId::Sora2
        })
    );
}

#[tokio::test]
async fn test_poll_api_key_override_reaches_provider() {
    let mut server = MockServer::start(vec![MockResponse::json(
        200,
        json!({"id": "video_4", "status": "completed", "video_url": "https://cdn/v4.mp4"}),
    )]);
    let client = VideoGenerationClient::builder()
        .with_default_provider(ProviderId::Sora2)
        .with_provider_config(
            ProviderId::Sora2,
            ProviderConfig::default()
                .with_api_key("config-key")
                .with_base_url(server.url()),
        )
        .build();

    let result = client
        .poll_until_done(
            "video_4",
            None,
            PollOptions::default().with_api_key("poll-key"),
        )
        .await
        .expect("poll should succeed");

    assert_eq!(result.video_url.as_deref(), Some("https://cdn/v4.mp4"));

    server.shutdown();
    let captured = server.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].path, "/v1/videos/video_4");
    assert_eq!(
        captured[0].headers.get("authorization"),
        Some(&"Bearer poll-key".to_string())
    );
}
