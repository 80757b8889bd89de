use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AgentStore, ExecutionRecord, ExecutionStore, StepRecord};
use crate::agent::AgentConfig;
use crate::error::AgentryError;

/// In-process store for agents, executions, and step logs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    agents: RwLock<HashMap<String, AgentConfig>>,
    executions: RwLock<HashMap<Uuid, ExecutionRecord>>,
    steps: RwLock<Vec<StepRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_agent(&self, agent: AgentConfig) {
        self.agents.write().await.insert(agent.id.clone(), agent);
    }

    pub async fn execution(&self, execution_id: Uuid) -> Option<ExecutionRecord> {
        self.executions.read().await.get(&execution_id).cloned()
    }

    /// Steps of one execution in append order.
    pub async fn steps_for(&self, execution_id: Uuid) -> Vec<StepRecord> {
        self.steps
            .read()
            .await
            .iter()
            .filter(|s| s.execution_id == execution_id)
            .cloned()
            .collect()
    }

    pub async fn execution_count(&self) -> usize {
        self.executions.read().await.len()
    }
}

#[async_trait]
impl AgentStore for MemoryStore {
    async fn load_agent(&self, agent_id: &str) -> Result<Option<AgentConfig>, AgentryError> {
        Ok(self.agents.read().await.get(agent_id).cloned())
    }
}

#[async_trait]
impl ExecutionStore for MemoryStore {
    async fn save_execution(&self, record: ExecutionRecord) -> Result<(), AgentryError> {
        self.executions
            .write()
            .await
            .insert(record.execution_id, record);
        Ok(())
    }

    async fn append_steps(&self, steps: Vec<StepRecord>) -> Result<(), AgentryError> {
        self.steps.write().await.extend(steps);
        Ok(())
    }
}
