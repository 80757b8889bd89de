//! OpenAI Chat Completions API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::AgentryError;
use crate::models::{is_reasoning_model, ModelFamily};
use crate::types::{ChatMessage, Role, ToolCall, Usage};

use super::http::{bearer_headers, error_for_response};
use super::{parse_tool_arguments, untracked_tool_result};
use super::{ChatOptions, ChatResponse, FinishReason, ModelProvider};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }

    fn build_request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> Value {
        let messages: Vec<Value> = messages.iter().map(message_to_openai).collect();

        let mut body = json!({
            "model": options.model,
            "messages": messages,
        });
        if is_reasoning_model(&options.model) {
            body["max_completion_tokens"] = json!(options.max_tokens);
        } else {
            body["temperature"] = json!(options.clamped_temperature());
            body["max_tokens"] = json!(options.max_tokens);
        }

        if !options.tools.is_empty() {
            let tool_defs: Vec<Value> = options
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tool_defs);
        }

        body
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn supports_model(&self, model: &str) -> bool {
        ModelFamily::OpenAi.matches(model)
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, AgentryError> {
        let body = self.build_request_body(messages, options);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %options.model, messages = messages.len(), "OpenAI chat");

        let resp = self
            .client
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_response(resp).await);
        }

        let data: OpenAiChatResponse = resp.json().await?;
        parse_response(data)
    }
}

fn parse_response(data: OpenAiChatResponse) -> Result<ChatResponse, AgentryError> {
    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentryError::Provider {
            provider: "openai".into(),
            message: "No choices in response".into(),
        })?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            Ok(ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: parse_tool_arguments(&tc.function.arguments)?,
            })
        })
        .collect::<Result<Vec<_>, AgentryError>>()?;

    Ok(ChatResponse {
        text: choice.message.content.unwrap_or_default(),
        tool_calls,
        usage: data
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default(),
        finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
    })
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

fn message_to_openai(msg: &ChatMessage) -> Value {
    match msg.role {
        Role::System => json!({ "role": "system", "content": msg.content }),
        Role::User => json!({ "role": "user", "content": msg.content }),
        Role::Assistant if msg.tool_calls.is_empty() => {
            json!({ "role": "assistant", "content": msg.content })
        }
        Role::Assistant => {
            let calls: Vec<Value> = msg
                .tool_calls
                .iter()
                .map(|tc| {
                    json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": tc.arguments.to_string(),
                        }
                    })
                })
                .collect();
            let content = if msg.content.is_empty() {
                Value::Null
            } else {
                Value::String(msg.content.clone())
            };
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        Role::Tool => match &msg.tool_call_id {
            Some(id) => json!({
                "role": "tool",
                "tool_call_id": id,
                "content": msg.content,
            }),
            None => json!({ "role": "user", "content": untracked_tool_result(msg) }),
        },
    }
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolDefinition;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("test-key".into(), None, reqwest::Client::new())
    }

    #[test]
    fn request_body_keeps_system_message_inline() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let body = provider().build_request_body(&messages, &ChatOptions::new("gpt-4o"));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 4096);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn reasoning_models_skip_sampling_params() {
        let body =
            provider().build_request_body(&[ChatMessage::user("hi")], &ChatOptions::new("o3-mini"));
        assert_eq!(body["max_completion_tokens"], 4096);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn tools_use_function_calling_shape() {
        let options = ChatOptions::builder()
            .model("gpt-4o")
            .tools(vec![ToolDefinition {
                name: "web_search".into(),
                description: "Search the web".into(),
                parameters: json!({"type": "object"}),
            }])
            .build();
        let body = provider().build_request_body(&[ChatMessage::user("hi")], &options);
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
        assert_eq!(body["tools"][0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn tool_pairing_uses_call_ids() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: json!({"query": "rust"}),
        };
        let assistant = message_to_openai(&ChatMessage::assistant_with_calls("", vec![call]));
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            r#"{"query":"rust"}"#
        );

        let result = message_to_openai(&ChatMessage::tool_result(
            "web_search",
            Some("call_1".into()),
            "ok",
        ));
        assert_eq!(result["role"], "tool");
        assert_eq!(result["tool_call_id"], "call_1");
    }

    #[test]
    fn parses_tool_calls_and_usage() {
        let data: OpenAiChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "http_request", "arguments": "{\"url\":\"https://example.com\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        }))
        .unwrap();
        let resp = parse_response(data).unwrap();
        assert_eq!(resp.text, "");
        assert_eq!(resp.tool_calls[0].name, "http_request");
        assert_eq!(resp.tool_calls[0].arguments["url"], "https://example.com");
        assert_eq!(resp.usage, Usage::new(12, 8));
        assert_eq!(resp.finish_reason, Some(FinishReason::ToolCalls));
    }

    #[test]
    fn empty_choices_is_provider_error() {
        let data: OpenAiChatResponse =
            serde_json::from_value(json!({"choices": [], "usage": null})).unwrap();
        assert!(matches!(
            parse_response(data),
            Err(AgentryError::Provider { .. })
        ));
    }
}
