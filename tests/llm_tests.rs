//! OpenAI-compatible client tests against a mocked HTTP provider
//!
//! These tests use wiremock to stand in for the provider and validate:
//! - Chat completion requests and parsing
//! - Error classification (HTTP status, malformed body, timeout, missing key)
//! - The grouped-job flow and the capability probe
//! - A full collaboration over HTTP

use conclave::agents::{CollaborationSettings, Orchestrator};
use conclave::llm::{
    BulkCompletion, BulkRequest, CompletionParams, GatewaySettings, LLMClient, OpenAIClient,
    ProviderError,
};
use conclave::types::{ChatMessage, CollaborationMode};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

fn mock_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "grok-3-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn params() -> CompletionParams {
    CompletionParams {
        model: "grok-3-mini".to_string(),
        max_tokens: 1500,
        temperature: 0.7,
    }
}

fn client_for(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(format!("{}/v1", server.uri()), Some("test-key".to_string()))
        .with_batch_poll_interval(Duration::from_millis(10))
}

// ============= Chat Completions =============

#[tokio::test]
async fn test_completion_sends_model_and_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "grok-3-mini",
            "max_tokens": 1500,
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .complete(
            &[ChatMessage::system("be brief"), ChatMessage::user("hi")],
            &params(),
        )
        .await;

    assert_eq!(result, Ok("hello".to_string()));
}

#[tokio::test]
async fn test_http_error_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[ChatMessage::user("hi")], &params())
        .await
        .unwrap_err();

    match err {
        ProviderError::Provider(msg) => {
            assert!(msg.contains("HTTP 500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[ChatMessage::user("hi")], &params())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Provider(ref m) if m.contains("malformed response")));
}

#[tokio::test]
async fn test_empty_choices_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[ChatMessage::user("hi")], &params())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::Provider("no choices in response".to_string()));
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mock_completion("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).with_request_timeout(Duration::from_millis(100));
    let err = client
        .complete(&[ChatMessage::user("hi")], &params())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::Timeout(Duration::from_millis(100)));
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenAIClient::new(format!("{}/v1", server.uri()), None);
    assert!(!client.has_credentials());

    let err = client
        .complete(&[ChatMessage::user("hi")], &params())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)));
}

// ============= Bulk Jobs =============

#[tokio::test]
async fn test_probe_detects_batch_support() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/batches"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batches": []})))
        .mount(&server)
        .await;

    assert!(client_for(&server).probe_bulk_support().await);
}

#[tokio::test]
async fn test_probe_rejects_missing_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/batches"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(!client_for(&server).probe_bulk_support().await);
}

fn bulk_request(id: &str) -> BulkRequest {
    BulkRequest {
        custom_id: id.to_string(),
        messages: vec![ChatMessage::system(id), ChatMessage::user("q")],
        params: params(),
    }
}

#[tokio::test]
async fn test_bulk_job_results_follow_request_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/batches"))
        .and(body_partial_json(json!({"name": "conclave_collab_test"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batch_id": "b-1"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/batches/b-1/requests"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/batches/b-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"state": {"num_pending": 0}})),
        )
        .mount(&server)
        .await;

    // results come back out of order, one item failed
    Mock::given(method("GET"))
        .and(path("/v1/batches/b-1/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "batch_request_id": "critic",
                    "batch_result": {"error": {"message": "rate limited"}}
                },
                {
                    "batch_request_id": "analyst",
                    "batch_result": {"response": {"chat_get_completion": {
                        "choices": [{"message": {"role": "assistant", "content": "numbers"}}]
                    }}}
                }
            ]
        })))
        .mount(&server)
        .await;

    let results = client_for(&server)
        .submit_batch(
            "conclave_collab_test",
            vec![bulk_request("analyst"), bulk_request("critic"), bulk_request("mentor")],
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Ok("numbers".to_string()));
    assert_eq!(
        results[1],
        Err(ProviderError::Provider("rate limited".to_string()))
    );
    assert!(matches!(results[2], Err(ProviderError::Provider(ref m)) if m.contains("mentor")));
}

#[tokio::test]
async fn test_bulk_job_creation_failure_is_job_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/batches"))
        .respond_with(ResponseTemplate::new(403).set_body_string("batches disabled"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit_batch("conclave_collab_x", vec![bulk_request("analyst")])
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Provider(ref m) if m.contains("HTTP 403")));
}

// ============= End-to-end over HTTP =============

#[tokio::test]
async fn test_sequential_collaboration_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "grok-4-1-fast-reasoning"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("final synthesis")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "grok-3-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("persona view")))
        .expect(2)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(
        Arc::new(client_for(&server)),
        None,
        GatewaySettings::default(),
        CollaborationSettings::default(),
    );

    let result = orchestrator
        .orchestrate("Should we adopt event sourcing?", Some(2), &[])
        .await
        .unwrap();

    assert_eq!(result.mode, CollaborationMode::Sequential);
    assert_eq!(result.answers.len(), 2);
    assert!(result.answers.iter().all(|a| a.content == "persona view"));
    assert_eq!(result.synthesis.as_deref(), Some("final synthesis"));
}
