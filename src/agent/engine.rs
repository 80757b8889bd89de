//! The ReAct execution loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::config::{AgentConfig, AttachedTool, CallerIdentity};
use super::prompt::build_system_prompt;
use super::result::{ExecutionResult, ExecutionStatus};
use super::step::StepSink;
use super::trace::ExecutionTrace;
use crate::config::GatewayDefaults;
use crate::error::AgentryError;
use crate::models::PriceTable;
use crate::provider::{ChatOptions, LlmGateway, ToolDefinition};
use crate::tools::{AgentToolParameters, ToolExecutionContext, ToolRegistry};
use crate::types::ChatMessage;

/// Output of an execution that used its whole iteration budget.
pub const MAX_ITERATIONS_OUTPUT: &str =
    "Maximum iterations reached without a final answer.";

/// Drives executions against shared, read-only collaborators.
///
/// One engine serves any number of concurrent executions; all per-execution
/// state lives in the [`ExecutionTrace`] and conversation owned by each
/// `execute` call.
#[derive(Clone)]
pub struct ExecutionEngine {
    gateway: Arc<LlmGateway>,
    tools: Arc<ToolRegistry>,
    pricing: Arc<PriceTable>,
    defaults: GatewayDefaults,
    sink: Option<StepSink>,
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("gateway", &self.gateway)
            .field("tools", &self.tools)
            .field("defaults", &self.defaults)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl ExecutionEngine {
    pub fn new(
        gateway: Arc<LlmGateway>,
        tools: Arc<ToolRegistry>,
        pricing: Arc<PriceTable>,
    ) -> Self {
        Self {
            gateway,
            tools,
            pricing,
            defaults: GatewayDefaults::default(),
            sink: None,
        }
    }

    /// Temperature and token limit for agents that do not set their own.
    pub fn with_defaults(mut self, defaults: GatewayDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Receive every step as it is recorded.
    pub fn with_step_sink(mut self, sink: StepSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run `agent` on `input`. Never fails: every failure is reported through
    /// the returned result's status and `error` field.
    pub async fn execute(
        &self,
        agent: &AgentConfig,
        input: &str,
        caller: &CallerIdentity,
    ) -> ExecutionResult {
        let execution_id = Uuid::new_v4();
        let span = info_span!(
            "execution",
            %execution_id,
            agent_id = %agent.id,
            user_id = caller.user_id.as_deref().unwrap_or("anonymous"),
        );
        self.run(execution_id, agent, input, caller)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        execution_id: Uuid,
        agent: &AgentConfig,
        input: &str,
        caller: &CallerIdentity,
    ) -> ExecutionResult {
        let started = Instant::now();
        let mut trace = ExecutionTrace::new(execution_id, self.sink.clone());
        info!(model = %agent.model, max_iterations = agent.max_iterations, "execution started");

        let (status, output, error) =
            match self.drive(agent, input, caller, &mut trace, started).await {
                Ok((status, output)) => (status, output, None),
                Err(err) => {
                    warn!(error = %err, category = ?err.category(), "execution failed");
                    (ExecutionStatus::Error, String::new(), Some(err.to_string()))
                }
            };

        let result = trace.finish(&agent.id, status, output, error, started.elapsed());
        info!(
            status = %result.status,
            iterations = result.iterations,
            total_tokens = result.usage.total_tokens,
            cost = result.cost,
            duration_ms = result.duration_ms,
            "execution finished"
        );
        result
    }

    async fn drive(
        &self,
        agent: &AgentConfig,
        input: &str,
        caller: &CallerIdentity,
        trace: &mut ExecutionTrace,
        started: Instant,
    ) -> Result<(ExecutionStatus, String), AgentryError> {
        let timeout = Duration::from_secs(agent.timeout_seconds);
        let attached = self.resolve_tools(agent);
        let options = ChatOptions::builder()
            .model(agent.model.as_str())
            .tools(attached.iter().map(to_definition).collect())
            .temperature(agent.temperature.unwrap_or(self.defaults.temperature))
            .max_tokens(agent.max_tokens.unwrap_or(self.defaults.max_tokens))
            .build();

        let prompt_agent = AgentConfig {
            tools: attached,
            ..agent.clone()
        };
        let mut messages = vec![
            ChatMessage::system(build_system_prompt(&prompt_agent)),
            ChatMessage::user(input),
        ];

        while trace.iteration() < agent.max_iterations {
            if started.elapsed() >= timeout {
                warn!(iteration = trace.iteration(), "execution timed out");
                return Ok((
                    ExecutionStatus::Timeout,
                    format!(
                        "Execution timed out after {} seconds.",
                        agent.timeout_seconds
                    ),
                ));
            }

            let iteration = trace.begin_iteration();
            debug!(iteration, messages = messages.len(), "calling model");

            let response = self.gateway.chat(&messages, &options).await?;
            let cost = self.pricing.cost(&agent.model, &response.usage);
            trace.add_usage(&response.usage, cost);

            if response.tool_calls.is_empty() {
                trace.record_final(response.text.as_str());
                return Ok((ExecutionStatus::Success, response.text));
            }

            for call in response.tool_calls {
                trace.record_reasoning(response.text.as_str());
                trace.record_action(call.name.as_str(), call.arguments.clone());

                let ctx = ToolExecutionContext {
                    execution_id: Some(trace.execution_id()),
                    user_id: caller.user_id.clone(),
                    tool_config: prompt_agent.tool(&call.name).and_then(|t| t.config.clone()),
                };
                debug!(iteration, tool = %call.name, "executing tool");
                let outcome = self
                    .tools
                    .execute(&call.name, call.arguments.clone(), &ctx)
                    .await;
                let observation = outcome.to_observation();
                trace.record_observation(observation.as_str());

                let tool_name = call.name.clone();
                let call_id = call.id.clone();
                messages.push(ChatMessage::assistant_with_calls(
                    response.text.as_str(),
                    vec![call],
                ));
                messages.push(
                    ChatMessage::tool_result(tool_name, Some(call_id), observation)
                        .with_tool_error(!outcome.success),
                );
            }
        }

        warn!(iterations = trace.iteration(), "iteration budget exhausted");
        Ok((
            ExecutionStatus::MaxIterationsReached,
            MAX_ITERATIONS_OUTPUT.to_string(),
        ))
    }

    /// Fill missing descriptions and schemas from the registry.
    fn resolve_tools(&self, agent: &AgentConfig) -> Vec<AttachedTool> {
        agent
            .tools
            .iter()
            .map(|attached| {
                let mut resolved = attached.clone();
                if let Some(tool) = self.tools.get(&attached.name) {
                    if resolved.description.is_none() {
                        resolved.description = Some(tool.description().to_string());
                    }
                    if resolved.parameters.is_none() {
                        resolved.parameters = Some(tool.parameters().schema.clone());
                    }
                }
                resolved
            })
            .collect()
    }
}

fn to_definition(tool: &AttachedTool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name.clone(),
        description: tool.description.clone().unwrap_or_default(),
        parameters: tool
            .parameters
            .clone()
            .unwrap_or_else(|| AgentToolParameters::empty().schema),
    }
}
