#![cfg(all(feature = "openai", feature = "anthropic"))]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agentry::config::AgentryConfig;
use agentry::error::AgentryError;
use agentry::provider::anthropic::AnthropicProvider;
use agentry::provider::openai::OpenAiProvider;
use agentry::provider::{ChatOptions, FinishReason, LlmGateway, ToolDefinition};
use agentry::types::{ChatMessage, ToolCall, Usage};

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        name: "web_search".into(),
        description: "Search the web".into(),
        parameters: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        }),
    }
}

fn openai_gateway(server: &MockServer) -> LlmGateway {
    LlmGateway::new().with_provider(Arc::new(OpenAiProvider::new(
        "sk-test".into(),
        Some(server.uri()),
        reqwest::Client::new(),
    )))
}

fn anthropic_gateway(server: &MockServer) -> LlmGateway {
    LlmGateway::new().with_provider(Arc::new(AnthropicProvider::new(
        "ant-test".into(),
        Some(server.uri()),
        reqwest::Client::new(),
    )))
}

#[tokio::test]
async fn openai_tool_call_is_normalized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "system", "content": "be brief"}, {"role": "user", "content": "rust news?"}],
            "tools": [{"type": "function", "function": {"name": "web_search"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Searching.",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{\"query\":\"rust news\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = ChatOptions::builder()
        .model("gpt-4o-mini")
        .tools(vec![search_tool()])
        .build();
    let response = openai_gateway(&server)
        .chat(
            &[ChatMessage::system("be brief"), ChatMessage::user("rust news?")],
            &options,
        )
        .await
        .expect("chat should succeed");

    assert_eq!(response.text, "Searching.");
    assert_eq!(
        response.tool_calls,
        vec![ToolCall {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: json!({"query": "rust news"}),
        }]
    );
    assert_eq!(response.usage, Usage::new(42, 7));
    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
}

#[tokio::test]
async fn openai_invalid_tool_arguments_fail_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{query: rust"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1}
        })))
        .mount(&server)
        .await;

    let err = openai_gateway(&server)
        .chat(&[ChatMessage::user("hi")], &ChatOptions::new("gpt-4o"))
        .await
        .expect_err("malformed arguments should fail");

    assert!(matches!(err, AgentryError::Serialization(_)), "got {err:?}");
}

#[tokio::test]
async fn openai_status_codes_map_to_error_kinds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"error": {"message": "slow down", "retry_after": 2}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4.1"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let gateway = openai_gateway(&server);
    let messages = [ChatMessage::user("hi")];

    let err = gateway
        .chat(&messages, &ChatOptions::new("gpt-4o"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentryError::Authentication(ref m) if m == "invalid api key"));

    let err = gateway
        .chat(&messages, &ChatOptions::new("gpt-4o-mini"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AgentryError::RateLimited {
            retry_after_ms: Some(2000)
        }
    ));
    assert!(err.is_retryable());

    let err = gateway
        .chat(&messages, &ChatOptions::new("gpt-4.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentryError::Api { status: 500, .. }));
}

#[tokio::test]
async fn anthropic_request_uses_native_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-haiku-20241022",
            "system": "be brief",
            "messages": [{"role": "user", "content": "rust news?"}],
            "tools": [{"name": "web_search", "input_schema": {"type": "object"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me search."},
                {"type": "tool_use", "id": "toolu_1", "name": "web_search", "input": {"query": "rust news"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 30, "output_tokens": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = ChatOptions::builder()
        .model("claude-3-5-haiku-20241022")
        .tools(vec![search_tool()])
        .build();
    let response = anthropic_gateway(&server)
        .chat(
            &[ChatMessage::system("be brief"), ChatMessage::user("rust news?")],
            &options,
        )
        .await
        .expect("chat should succeed");

    assert_eq!(response.text, "Let me search.");
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "toolu_1");
    assert_eq!(response.tool_calls[0].arguments, json!({"query": "rust news"}));
    assert_eq!(response.usage, Usage::new(30, 12));
    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let turns = body["messages"].as_array().unwrap();
    assert!(turns.iter().all(|t| t["role"] != "system"));
}

#[tokio::test]
async fn anthropic_tool_results_follow_tool_use() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "user", "content": "search"},
                {"role": "assistant", "content": [{"type": "tool_use", "id": "toolu_1", "name": "web_search"}]},
                {"role": "user", "content": [{"type": "tool_result", "tool_use_id": "toolu_1", "content": "[]"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Nothing found."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 50, "output_tokens": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let call = ToolCall {
        id: "toolu_1".into(),
        name: "web_search".into(),
        arguments: json!({"query": "x"}),
    };
    let messages = vec![
        ChatMessage::system("sys"),
        ChatMessage::user("search"),
        ChatMessage::assistant_with_calls("", vec![call]),
        ChatMessage::tool_result("web_search", Some("toolu_1".into()), "[]"),
    ];
    let response = anthropic_gateway(&server)
        .chat(&messages, &ChatOptions::new("claude-3-haiku-20240307"))
        .await
        .expect("chat should succeed");

    assert_eq!(response.text, "Nothing found.");
    assert!(response.tool_calls.is_empty());
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
}

#[tokio::test]
async fn gateway_routes_by_model_family() {
    let openai = MockServer::start().await;
    let anthropic = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "from openai"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1}
        })))
        .mount(&openai)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "from anthropic"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        })))
        .mount(&anthropic)
        .await;

    let config = AgentryConfig::new();
    config.set_api_key("openai", "sk-test".into());
    config.set_api_key("anthropic", "ant-test".into());
    config.set_base_url("openai", format!("{}/", openai.uri()));
    config.set_base_url("anthropic", anthropic.uri());
    let gateway = LlmGateway::from_config(&config).unwrap();
    let messages = [ChatMessage::user("hi")];

    let a = gateway
        .chat(&messages, &ChatOptions::new("o3-mini"))
        .await
        .unwrap();
    let b = gateway
        .chat(&messages, &ChatOptions::new("claude-sonnet-4-20250514"))
        .await
        .unwrap();
    assert_eq!(a.text, "from openai");
    assert_eq!(b.text, "from anthropic");

    let err = gateway
        .chat(&messages, &ChatOptions::new("gemini-1.5-pro"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentryError::UnsupportedModel(ref m) if m == "gemini-1.5-pro"));
}
