//! Single-writer accumulator for one execution.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use super::result::{ExecutionResult, ExecutionStatus};
use super::step::{ExecutionStep, StepKind, StepPayload, StepSink};
use crate::types::Usage;

/// Steps, usage, cost and the iteration counter of one execution.
///
/// Owned by the loop driving that execution and consumed by [`finish`](Self::finish).
pub struct ExecutionTrace {
    execution_id: Uuid,
    iteration: u32,
    steps: Vec<ExecutionStep>,
    usage: Usage,
    cost: f64,
    sink: Option<StepSink>,
}

impl ExecutionTrace {
    pub fn new(execution_id: Uuid, sink: Option<StepSink>) -> Self {
        Self {
            execution_id,
            iteration: 0,
            steps: Vec::new(),
            usage: Usage::default(),
            cost: 0.0,
            sink,
        }
    }

    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    /// Iterations started so far.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Start the next iteration and return its 1-based number.
    pub fn begin_iteration(&mut self) -> u32 {
        self.iteration += 1;
        self.iteration
    }

    /// Accumulate one call's usage and its cost. Negative costs are ignored.
    pub fn add_usage(&mut self, usage: &Usage, cost: f64) {
        self.usage.merge(usage);
        if cost.is_finite() && cost > 0.0 {
            self.cost += cost;
        }
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    pub fn record_reasoning(&mut self, text: impl Into<String>) {
        self.push(StepKind::Reasoning, StepPayload::Text(text.into()));
    }

    pub fn record_action(&mut self, tool_name: impl Into<String>, arguments: serde_json::Value) {
        self.push(
            StepKind::Action,
            StepPayload::Action {
                tool_name: tool_name.into(),
                arguments,
            },
        );
    }

    pub fn record_observation(&mut self, text: impl Into<String>) {
        self.push(StepKind::Observation, StepPayload::Text(text.into()));
    }

    pub fn record_final(&mut self, text: impl Into<String>) {
        self.push(StepKind::Final, StepPayload::Text(text.into()));
    }

    fn push(&mut self, kind: StepKind, payload: StepPayload) {
        let step = ExecutionStep {
            step_number: self.iteration,
            kind,
            payload,
            created_at: Utc::now(),
        };
        if let Some(sink) = &self.sink {
            sink(&step);
        }
        self.steps.push(step);
    }

    /// Seal the trace into the execution's result.
    pub fn finish(
        self,
        agent_id: impl Into<String>,
        status: ExecutionStatus,
        output: impl Into<String>,
        error: Option<String>,
        elapsed: Duration,
    ) -> ExecutionResult {
        ExecutionResult {
            execution_id: self.execution_id,
            agent_id: agent_id.into(),
            status,
            output: output.into(),
            steps: self.steps,
            iterations: self.iteration,
            usage: self.usage,
            cost: self.cost,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error,
        }
    }
}

impl std::fmt::Debug for ExecutionTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionTrace")
            .field("execution_id", &self.execution_id)
            .field("iteration", &self.iteration)
            .field("steps", &self.steps.len())
            .field("usage", &self.usage)
            .field("cost", &self.cost)
            .finish()
    }
}
