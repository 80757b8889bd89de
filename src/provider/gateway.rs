//! Uniform chat entry point that routes each call to a provider.

use std::sync::Arc;

use tracing::debug;

use crate::config::AgentryConfig;
use crate::error::AgentryError;
use crate::models::ModelFamily;
use crate::types::ChatMessage;

use super::http::build_client;
use super::{ChatOptions, ChatResponse, ModelProvider};

/// Routes chat calls to the first registered provider whose predicate
/// accepts the model identifier.
///
/// Immutable once built; share it behind an `Arc` across executions.
#[derive(Clone, Default)]
pub struct LlmGateway {
    providers: Vec<Arc<dyn ModelProvider>>,
}

impl std::fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.provider_name()).collect();
        f.debug_struct("LlmGateway").field("providers", &names).finish()
    }
}

impl LlmGateway {
    /// A gateway with no providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Earlier registrations win on overlap.
    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Build a gateway with every enabled provider that has an API key.
    #[allow(unused_variables, unused_mut)]
    pub fn from_config(config: &AgentryConfig) -> Result<Self, AgentryError> {
        let client = build_client(config.defaults().request_timeout)?;
        let mut gateway = Self::new();

        #[cfg(feature = "openai")]
        if let Some(api_key) = config.get_api_key("openai") {
            gateway = gateway.with_provider(Arc::new(super::openai::OpenAiProvider::new(
                api_key,
                config.get_base_url("openai"),
                client.clone(),
            )));
        }

        #[cfg(feature = "anthropic")]
        if let Some(api_key) = config.get_api_key("anthropic") {
            gateway = gateway.with_provider(Arc::new(super::anthropic::AnthropicProvider::new(
                api_key,
                config.get_base_url("anthropic"),
                client.clone(),
            )));
        }

        Ok(gateway)
    }

    /// Names of the registered providers, in routing order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Resolve the provider for `model`.
    pub fn route(&self, model: &str) -> Result<&Arc<dyn ModelProvider>, AgentryError> {
        if let Some(provider) = self.providers.iter().find(|p| p.supports_model(model)) {
            return Ok(provider);
        }
        // A known family without a registered provider is a credentials problem,
        // not an unknown model.
        match ModelFamily::for_model(model)? {
            ModelFamily::OpenAi => Err(AgentryError::Configuration(
                "Missing OPENAI_API_KEY".into(),
            )),
            ModelFamily::Anthropic => Err(AgentryError::Configuration(
                "Missing ANTHROPIC_API_KEY".into(),
            )),
        }
    }

    /// Run one chat turn against the provider serving `options.model`.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, AgentryError> {
        let provider = self.route(&options.model)?;
        debug!(
            provider = provider.provider_name(),
            model = %options.model,
            tools = options.tools.len(),
            "gateway chat"
        );
        let response = provider.chat(messages, options).await?;
        debug!(
            provider = provider.provider_name(),
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            tool_calls = response.tool_calls.len(),
            "gateway chat complete"
        );
        Ok(response)
    }
}
