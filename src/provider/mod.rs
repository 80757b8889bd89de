//! Model provider trait, provider adapters, and the routing gateway.

pub mod gateway;
pub mod http;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "openai")]
pub mod openai;

pub use gateway::LlmGateway;

use async_trait::async_trait;
use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::AgentryError;
use crate::types::{ChatMessage, ToolCall, Usage};

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Per-call options.
#[derive(Debug, Clone, Builder)]
pub struct ChatOptions {
    /// Model identifier; also selects the provider.
    #[builder(into)]
    pub model: String,
    /// Tools the model may call this turn.
    #[builder(default)]
    pub tools: Vec<ToolDefinition>,
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
    #[builder(default = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

impl ChatOptions {
    /// Options for `model` with default temperature and token limit.
    pub fn new(model: impl Into<String>) -> Self {
        Self::builder().model(model).build()
    }

    /// Temperature clamped to `[0, 2]`.
    pub fn clamped_temperature(&self) -> f64 {
        if self.temperature.is_nan() {
            return DEFAULT_TEMPERATURE;
        }
        self.temperature.clamp(0.0, 2.0)
    }
}

/// Why generation finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

/// Normalized response from any provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    /// May be empty when the model only called tools.
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by all model providers.
///
/// Implementations hold no per-execution state and must be safe to call
/// concurrently.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai", "anthropic").
    fn provider_name(&self) -> &str;

    /// Routing predicate: whether this provider serves `model`.
    fn supports_model(&self, model: &str) -> bool;

    /// Run one non-streaming chat turn.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, AgentryError>;
}

/// Parse provider-supplied tool arguments. Blank input means "no arguments".
pub(crate) fn parse_tool_arguments(raw: &str) -> Result<serde_json::Value, AgentryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(serde_json::json!({}));
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Fallback rendering for a tool result that has no provider call id.
pub(crate) fn untracked_tool_result(msg: &ChatMessage) -> String {
    let name = msg.tool_name.as_deref().unwrap_or("tool");
    format!("[{name} result]\n{}", msg.content)
}
