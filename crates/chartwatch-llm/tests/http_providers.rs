//! Wire-level tests for the HTTP providers against a local mock server

use chartwatch_llm::providers::{
    AnthropicProvider, GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider,
};
use chartwatch_llm::{CompletionRequest, ImageSource, LLMError, LLMProvider, Message, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chart_request(model: &str) -> CompletionRequest {
    CompletionRequest::builder(model)
        .add_message(Message::user_with_images(
            "Analyze these trading charts briefly.",
            vec![ImageSource::Base64 {
                media_type: "image/png".to_string(),
                data: "iVBORw0KGgo=".to_string(),
            }],
        ))
        .max_tokens(512)
        .temperature(0.2)
        .build()
}

#[tokio::test]
async fn openai_compatible_sends_data_uri_and_parses_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer pplx-test"))
        .and(body_partial_json(json!({
            "model": "sonar-pro",
            "max_tokens": 512,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "Analyze these trading charts briefly."},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBORw0KGgo="}}
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Uptrend intact."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 900, "completion_tokens": 12, "total_tokens": 912}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAIProvider::with_config(
        OpenAIConfig::new("pplx-test")
            .with_api_base(server.uri())
            .with_provider_name("perplexity"),
    )
    .unwrap();

    let response = provider.complete(chart_request("sonar-pro")).await.unwrap();
    assert_eq!(response.text(), "Uptrend intact.");
    assert_eq!(response.usage.input_tokens, 900);
    assert_eq!(provider.name(), "perplexity");
}

#[tokio::test]
async fn openai_compatible_maps_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let provider =
        OpenAIProvider::with_config(OpenAIConfig::new("xai-test").with_api_base(server.uri()))
            .unwrap();

    let err = provider.complete(chart_request("grok-2")).await.unwrap_err();
    assert!(matches!(err, LLMError::RateLimitExceeded(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn anthropic_sends_native_image_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-sonnet-4-5-20250929",
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "Analyze these trading charts briefly."},
                    {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "iVBORw0KGgo="}}
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Sideways consolidation."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1500, "output_tokens": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new("sk-ant-test")
        .unwrap()
        .with_api_base(server.uri());

    let response = provider
        .complete(chart_request("claude-sonnet-4-5-20250929"))
        .await
        .unwrap();
    assert_eq!(response.text(), "Sideways consolidation.");
}

#[tokio::test]
async fn gemini_posts_generate_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-3-pro-preview:generateContent"))
        .and(header("x-goog-api-key", "AIza-test"))
        .and(body_partial_json(json!({
            "generationConfig": {"maxOutputTokens": 512}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "EMAIL ALERT DECISION: NO"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        GeminiProvider::with_config(GeminiConfig::new("AIza-test").with_api_base(server.uri()))
            .unwrap();

    let response = provider
        .complete(chart_request("gemini-3-pro-preview"))
        .await
        .unwrap();
    assert_eq!(response.text(), "EMAIL ALERT DECISION: NO");
}

#[tokio::test]
async fn gemini_resource_exhausted_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-3-pro-preview:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "status": "RESOURCE_EXHAUSTED", "message": "quota"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-3-pro-preview:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "recovered"}]},
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    let provider =
        GeminiProvider::with_config(GeminiConfig::new("AIza-test").with_api_base(server.uri()))
            .unwrap();

    let response = RetryPolicy::fast()
        .execute("gemini", || {
            provider.complete(chart_request("gemini-3-pro-preview"))
        })
        .await
        .unwrap();
    assert_eq!(response.text(), "recovered");
}

#[tokio::test]
async fn server_errors_surface_as_service_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new("sk-ant-test")
        .unwrap()
        .with_api_base(server.uri());

    let err = RetryPolicy::no_retry()
        .execute("anthropic", || {
            provider.complete(chart_request("claude-sonnet-4-5-20250929"))
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::ServiceUnavailable(_)));
}
