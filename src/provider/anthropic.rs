//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::AgentryError;
use crate::models::ModelFamily;
use crate::types::{ChatMessage, Role, ToolCall, Usage};

use super::http::{anthropic_headers, error_for_response};
use super::untracked_tool_result;
use super::{ChatOptions, ChatResponse, FinishReason, ModelProvider};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
/// The Messages API rejects temperatures above 1.
const MAX_TEMPERATURE: f64 = 1.0;

pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }

    fn build_request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> Value {
        let mut system_parts = Vec::new();
        let mut turns = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(msg.content.as_str()),
                Role::User => turns.push(json!({ "role": "user", "content": msg.content })),
                Role::Assistant => {
                    let mut content: Vec<Value> = Vec::new();
                    if !msg.content.is_empty() {
                        content.push(json!({ "type": "text", "text": msg.content }));
                    }
                    for tc in &msg.tool_calls {
                        content.push(json!({
                            "type": "tool_use",
                            "id": tc.id,
                            "name": tc.name,
                            "input": tc.arguments,
                        }));
                    }
                    if !content.is_empty() {
                        turns.push(json!({ "role": "assistant", "content": content }));
                    }
                }
                Role::Tool => match &msg.tool_call_id {
                    Some(id) => turns.push(json!({
                        "role": "user",
                        "content": [{
                            "type": "tool_result",
                            "tool_use_id": id,
                            "content": msg.content,
                            "is_error": msg.tool_error,
                        }],
                    })),
                    None => turns.push(json!({
                        "role": "user",
                        "content": untracked_tool_result(msg),
                    })),
                },
            }
        }

        let mut body = json!({
            "model": options.model,
            "messages": turns,
            "max_tokens": options.max_tokens,
            "temperature": options.clamped_temperature().min(MAX_TEMPERATURE),
        });

        if !system_parts.is_empty() {
            body["system"] = Value::String(system_parts.join("\n\n"));
        }

        if !options.tools.is_empty() {
            let tool_defs: Vec<Value> = options
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.parameters,
                    })
                })
                .collect();
            body["tools"] = Value::Array(tool_defs);
        }

        body
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn supports_model(&self, model: &str) -> bool {
        ModelFamily::Anthropic.matches(model)
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, AgentryError> {
        let body = self.build_request_body(messages, options);
        let url = format!("{}/messages", self.base_url);

        debug!(model = %options.model, messages = messages.len(), "Anthropic chat");

        let resp = self
            .client
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_response(resp).await);
        }

        let data: AnthropicResponse = resp.json().await?;
        Ok(parse_response(data))
    }
}

fn parse_response(data: AnthropicResponse) -> ChatResponse {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in data.content {
        match block {
            AnthropicContentBlock::Text { text: t } => text.push_str(&t),
            AnthropicContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id,
                name,
                arguments: if input.is_null() { json!({}) } else { input },
            }),
            AnthropicContentBlock::Other => {}
        }
    }

    ChatResponse {
        text,
        tool_calls,
        usage: Usage::new(data.usage.input_tokens, data.usage.output_tokens),
        finish_reason: data.stop_reason.as_deref().and_then(parse_stop_reason),
    }
}

fn parse_stop_reason(s: &str) -> Option<FinishReason> {
    match s {
        "end_turn" | "stop_sequence" => Some(FinishReason::Stop),
        "max_tokens" => Some(FinishReason::Length),
        "tool_use" => Some(FinishReason::ToolCalls),
        "refusal" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

// Anthropic API response types (internal)

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}
