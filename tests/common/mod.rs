//! Shared test helpers: a scripted model provider and engine wiring.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use agentry::agent::{AgentConfig, AttachedTool, ExecutionEngine};
use agentry::error::AgentryError;
use agentry::models::{ModelRates, PriceTable};
use agentry::provider::{ChatOptions, ChatResponse, FinishReason, LlmGateway, ModelProvider};
use agentry::tools::{AgentTool, AgentToolParameters, Tool, ToolRegistry};
use agentry::types::{ChatMessage, ToolCall, Usage};

/// One request as seen by [`MockProvider`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
}

/// A provider that replays queued responses in order.
///
/// When the queue is empty it returns the repeat response if one is set,
/// otherwise a plain "Mock response" answer.
#[derive(Default)]
pub struct MockProvider {
    queue: Mutex<VecDeque<Result<ChatResponse, AgentryError>>>,
    repeat: Mutex<Option<ChatResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long (on the tokio clock) before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_response(&self, response: ChatResponse) {
        self.queue.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_text(&self, text: &str) {
        self.queue_response(text_response(text));
    }

    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.queue_response(tool_call_response("", &[(id, name, args)]));
    }

    pub fn queue_error(&self, err: AgentryError) {
        self.queue.lock().unwrap().push_back(Err(err));
    }

    /// Return `response` forever once the queue is drained.
    pub fn repeat(&self, response: ChatResponse) {
        *self.repeat.lock().unwrap() = Some(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn supports_model(&self, _model: &str) -> bool {
        true
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, AgentryError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            options: options.clone(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.queue.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => {
                let repeat = self.repeat.lock().unwrap().clone();
                Ok(repeat.unwrap_or_else(|| text_response("Mock response")))
            }
        }
    }
}

pub fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        text: text.to_string(),
        tool_calls: vec![],
        usage: Usage::new(10, 20),
        finish_reason: Some(FinishReason::Stop),
    }
}

pub fn tool_call_response(text: &str, calls: &[(&str, &str, serde_json::Value)]) -> ChatResponse {
    ChatResponse {
        text: text.to_string(),
        tool_calls: calls
            .iter()
            .map(|(id, name, args)| ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args.clone(),
            })
            .collect(),
        usage: Usage::new(10, 5),
        finish_reason: Some(FinishReason::ToolCalls),
    }
}

/// $1 per million input tokens and $2 per million output tokens, for every model.
pub fn flat_pricing() -> PriceTable {
    PriceTable::empty(ModelRates::new(1.0, 2.0))
}

pub fn echo_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "echo",
        "Echo the text argument back",
        AgentToolParameters::object()
            .string("text", "Text to echo", true)
            .build(),
        |args, _ctx| async move { Ok(json!(args.get_str("text")?)) },
    ))
}

pub fn engine_with(provider: Arc<MockProvider>, tools: ToolRegistry) -> ExecutionEngine {
    ExecutionEngine::new(
        Arc::new(LlmGateway::new().with_provider(provider)),
        Arc::new(tools),
        Arc::new(flat_pricing()),
    )
}

pub fn agent(tools: &[&str]) -> AgentConfig {
    AgentConfig::builder()
        .id("test-agent")
        .system_prompt("You are a test agent.")
        .model("gpt-4o-mini")
        .max_iterations(5)
        .timeout_seconds(60)
        .tools(tools.iter().map(|name| AttachedTool::new(*name)).collect())
        .build()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}
