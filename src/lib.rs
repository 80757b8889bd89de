//! Agentry: a bounded ReAct execution engine for tool-using LLM agents.
//!
//! An agent is a system prompt, a model identifier, iteration and time
//! budgets, and a set of attached tools. The [`agent::ExecutionEngine`]
//! alternates model calls (through the [`provider::LlmGateway`]) with tool
//! calls (through the [`tools::ToolRegistry`]) until the model answers
//! without calling a tool, then returns a cost-tracked [`agent::ExecutionResult`]
//! with the full step trace.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentry::prelude::*;
//!
//! # async fn example() -> agentry::error::Result<()> {
//! let config = AgentryConfig::from_env();
//! let engine = ExecutionEngine::new(
//!     Arc::new(LlmGateway::from_config(&config)?),
//!     Arc::new(ToolRegistry::with_builtin_tools(&config)?),
//!     Arc::new(config.price_table()),
//! );
//! let agent = AgentConfig::builder()
//!     .id("researcher")
//!     .system_prompt("You research questions on the web.")
//!     .model("gpt-4o-mini")
//!     .tools(vec![AttachedTool::new("web_search")])
//!     .build();
//! let result = engine
//!     .execute(&agent, "What is new in Rust?", &CallerIdentity::anonymous())
//!     .await;
//! println!("{:?}: {}", result.status, result.output);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod store;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
