//! Agent execution: the bounded ReAct loop and the types it produces.
//!
//! An [`ExecutionEngine`] turns an [`AgentConfig`] plus user input into an
//! [`ExecutionResult`], alternating model calls with tool calls until the
//! model answers without calling a tool or a budget runs out.

pub mod config;
pub mod engine;
pub mod prompt;
pub mod result;
pub mod step;
pub mod trace;

pub use config::{AgentConfig, AttachedTool, CallerIdentity};
pub use engine::{ExecutionEngine, MAX_ITERATIONS_OUTPUT};
pub use prompt::build_system_prompt;
pub use result::{ExecutionResult, ExecutionStatus};
pub use step::{ExecutionStep, StepKind, StepPayload, StepSink};
pub use trace::ExecutionTrace;
