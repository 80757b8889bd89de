//! Convenience re-exports for common use.

pub use crate::agent::{
    AgentConfig, AttachedTool, CallerIdentity, ExecutionEngine, ExecutionResult, ExecutionStatus,
    ExecutionStep, StepKind,
};
pub use crate::config::AgentryConfig;
pub use crate::error::{AgentryError, Result};
pub use crate::models::PriceTable;
pub use crate::provider::{ChatOptions, ChatResponse, LlmGateway, ModelProvider};
pub use crate::store::{ExecutionService, MemoryStore};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments, ToolRegistry};
pub use crate::types::{ChatMessage, Role, Usage};
