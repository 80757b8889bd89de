//! Execution trace entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Callback invoked for every recorded step, in order.
pub type StepSink = Arc<dyn Fn(&ExecutionStep) + Send + Sync>;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepKind {
    Reasoning,
    Action,
    Observation,
    Final,
}

/// Kind-specific step content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepPayload {
    Action {
        tool_name: String,
        arguments: serde_json::Value,
    },
    Text(String),
}

/// One append-only entry of an execution's trace.
///
/// All steps recorded during one loop iteration share `step_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub step_number: u32,
    pub kind: StepKind,
    pub payload: StepPayload,
    pub created_at: DateTime<Utc>,
}

impl ExecutionStep {
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            StepPayload::Text(text) => Some(text),
            StepPayload::Action { .. } => None,
        }
    }

    pub fn tool_name(&self) -> Option<&str> {
        match &self.payload {
            StepPayload::Action { tool_name, .. } => Some(tool_name),
            StepPayload::Text(_) => None,
        }
    }
}
