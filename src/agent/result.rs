//! Terminal execution outcome.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::step::{ExecutionStep, StepKind};
use crate::types::Usage;

/// Terminal status. Exactly one is set per execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Error,
    Timeout,
    #[serde(rename = "max_iterations")]
    #[strum(serialize = "max_iterations")]
    MaxIterationsReached,
}

/// Everything an execution produced, returned exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub execution_id: Uuid,
    pub agent_id: String,
    pub status: ExecutionStatus,
    pub output: String,
    pub steps: Vec<ExecutionStep>,
    /// Loop iterations started (model calls attempted).
    pub iterations: u32,
    pub usage: Usage,
    /// Estimated cost in USD.
    pub cost: f64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Kinds of all steps, in order.
    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }
}
