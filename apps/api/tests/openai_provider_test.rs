//! Integration tests for the OpenAI chat-completions provider.
//!
//! The OpenAI endpoint is replaced by a wiremock server.

use mini_ai_api::llm_client::{CompletionProvider, OpenAiClient, ProviderError, MODEL};
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 42, "completion_tokens": 17, "total_tokens": 59}
    })
}

#[tokio::test]
async fn test_complete_sends_model_prompt_and_json_mode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(bearer_token("sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "the prompt"}],
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(r#"{"appName":"X"}"#)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(mock_server.uri(), "sk-test".to_string(), 0).unwrap();
    let text = client.complete(MODEL, "the prompt").await.unwrap();

    assert_eq!(text, r#"{"appName":"X"}"#);
}

#[tokio::test]
async fn test_auth_failure_surfaces_api_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(mock_server.uri(), "sk-bad".to_string(), 3).unwrap();
    let err = client.complete(MODEL, "p").await.unwrap_err();

    match err {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(mock_server.uri(), "sk-test".to_string(), 0).unwrap();
    let err = client.complete(MODEL, "p").await.unwrap_err();

    assert!(matches!(err, ProviderError::EmptyContent));
}

#[tokio::test]
async fn test_no_retry_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(mock_server.uri(), "sk-test".to_string(), 0).unwrap();
    let err = client.complete(MODEL, "p").await.unwrap_err();

    assert!(matches!(err, ProviderError::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_rate_limit_is_retried_when_enabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("{}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(mock_server.uri(), "sk-test".to_string(), 1).unwrap();
    let text = client.complete(MODEL, "p").await.unwrap();

    assert_eq!(text, "{}");
}

#[tokio::test]
async fn test_undecodable_success_body_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(mock_server.uri(), "sk-test".to_string(), 2).unwrap();
    let err = client.complete(MODEL, "p").await.unwrap_err();

    match err {
        ProviderError::Http(e) => assert!(e.is_decode()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}
