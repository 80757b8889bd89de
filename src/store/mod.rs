//! Persistence collaborators and the service that ties them to the engine.
//!
//! The engine never persists anything itself. [`ExecutionService`] loads the
//! agent, runs it, and writes the execution record plus its step log.

mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::{
    AgentConfig, CallerIdentity, ExecutionEngine, ExecutionResult, ExecutionStatus, ExecutionStep,
    StepKind, StepPayload,
};
use crate::error::AgentryError;

/// Source of agent definitions.
#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn load_agent(&self, agent_id: &str) -> Result<Option<AgentConfig>, AgentryError>;
}

/// Sink for execution records and their append-only step logs.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn save_execution(&self, record: ExecutionRecord) -> Result<(), AgentryError>;

    async fn append_steps(&self, steps: Vec<StepRecord>) -> Result<(), AgentryError>;
}

/// Durable summary of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub execution_id: Uuid,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub input: String,
    pub status: ExecutionStatus,
    pub output: String,
    pub iterations: u32,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn from_result(
        result: &ExecutionResult,
        caller: &CallerIdentity,
        input: &str,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let elapsed = Duration::milliseconds(i64::try_from(result.duration_ms).unwrap_or(i64::MAX));
        Self {
            execution_id: result.execution_id,
            agent_id: result.agent_id.clone(),
            user_id: caller.user_id.clone(),
            input: input.to_string(),
            status: result.status,
            output: result.output.clone(),
            iterations: result.iterations,
            prompt_tokens: result.usage.prompt_tokens,
            completion_tokens: result.usage.completion_tokens,
            total_tokens: result.usage.total_tokens,
            cost: result.cost,
            duration_ms: result.duration_ms,
            error: result.error.clone(),
            started_at: completed_at - elapsed,
            completed_at,
        }
    }
}

/// One persisted step, tagged with its execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub execution_id: Uuid,
    pub step_number: u32,
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_arguments: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl StepRecord {
    pub fn from_step(execution_id: Uuid, step: &ExecutionStep) -> Self {
        let (content, tool_name, tool_arguments) = match &step.payload {
            StepPayload::Text(text) => (Some(text.clone()), None, None),
            StepPayload::Action {
                tool_name,
                arguments,
            } => (None, Some(tool_name.clone()), Some(arguments.clone())),
        };
        Self {
            execution_id,
            step_number: step.step_number,
            kind: step.kind,
            content,
            tool_name,
            tool_arguments,
            created_at: step.created_at,
        }
    }
}

/// Load, execute, persist.
#[derive(Clone)]
pub struct ExecutionService {
    engine: ExecutionEngine,
    agents: Arc<dyn AgentStore>,
    executions: Arc<dyn ExecutionStore>,
}

impl ExecutionService {
    pub fn new(
        engine: ExecutionEngine,
        agents: Arc<dyn AgentStore>,
        executions: Arc<dyn ExecutionStore>,
    ) -> Self {
        Self {
            engine,
            agents,
            executions,
        }
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    /// Execute the stored agent `agent_id`.
    ///
    /// Fails only when the agent cannot be loaded or the record cannot be
    /// written; a failed execution is still `Ok` with an error status.
    pub async fn execute(
        &self,
        agent_id: &str,
        input: &str,
        caller: &CallerIdentity,
    ) -> Result<ExecutionResult, AgentryError> {
        let agent = self
            .agents
            .load_agent(agent_id)
            .await?
            .ok_or_else(|| AgentryError::InvalidArgument(format!("Unknown agent: {agent_id}")))?;

        let result = self.engine.execute(&agent, input, caller).await;
        self.persist(&result, caller, input).await?;
        Ok(result)
    }

    async fn persist(
        &self,
        result: &ExecutionResult,
        caller: &CallerIdentity,
        input: &str,
    ) -> Result<(), AgentryError> {
        let record = ExecutionRecord::from_result(result, caller, input, Utc::now());
        let steps: Vec<StepRecord> = result
            .steps
            .iter()
            .map(|step| StepRecord::from_step(result.execution_id, step))
            .collect();

        if let Err(err) = self.executions.save_execution(record).await {
            warn!(execution_id = %result.execution_id, error = %err, "failed to save execution");
            return Err(err);
        }
        self.executions.append_steps(steps).await?;
        info!(
            execution_id = %result.execution_id,
            steps = result.steps.len(),
            "execution persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Usage;
    use serde_json::json;

    #[test]
    fn step_record_flattens_payload() {
        let id = Uuid::new_v4();
        let action = ExecutionStep {
            step_number: 1,
            kind: StepKind::Action,
            payload: StepPayload::Action {
                tool_name: "send_email".into(),
                arguments: json!({"to": "a@example.com"}),
            },
            created_at: Utc::now(),
        };
        let record = StepRecord::from_step(id, &action);
        assert_eq!(record.tool_name.as_deref(), Some("send_email"));
        assert!(record.content.is_none());
    }

    #[test]
    fn execution_record_copies_totals() {
        let result = ExecutionResult {
            execution_id: Uuid::new_v4(),
            agent_id: "a".into(),
            status: ExecutionStatus::Success,
            output: "done".into(),
            steps: vec![],
            iterations: 1,
            usage: Usage::new(12, 3),
            cost: 0.5,
            duration_ms: 1500,
            error: None,
        };
        let now = Utc::now();
        let record = ExecutionRecord::from_result(&result, &CallerIdentity::user("u"), "hi", now);
        assert_eq!(record.total_tokens, 15);
        assert_eq!(record.user_id.as_deref(), Some("u"));
        assert_eq!(record.completed_at - record.started_at, Duration::milliseconds(1500));
    }
}
