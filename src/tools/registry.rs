//! Tool registry: the only path from the engine to side-effecting tools.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::result::ToolResult;
use super::tool::{Tool, ToolExecutionContext};
use crate::error::AgentryError;
use crate::provider::ToolDefinition;

/// Map from tool name to handler. Built once, then read-only and shared.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Registry holding every built-in tool, wired from `config`.
    #[cfg(feature = "builtin-tools")]
    pub fn with_builtin_tools(
        config: &crate::config::AgentryConfig,
    ) -> Result<Self, AgentryError> {
        let mut registry = Self::new();
        for tool in super::builtin::all_tools(config)? {
            registry.register(tool);
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Provider-facing definitions of every registered tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.names()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters().schema.clone(),
            })
            .collect()
    }

    /// Execute `name` once. Never fails: unknown tools, tool errors, and
    /// tool panics all come back as `success: false`.
    pub async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "unknown tool requested");
            return ToolResult::failure(AgentryError::UnknownTool(name.to_string()).to_string());
        };

        let args = ToolArguments::new(arguments);
        match AssertUnwindSafe(tool.execute(&args, ctx)).catch_unwind().await {
            Ok(Ok(data)) => {
                debug!(tool = name, "tool succeeded");
                ToolResult::ok(data)
            }
            Ok(Err(err)) => {
                warn!(tool = name, error = %err, "tool failed");
                ToolResult::failure(err.to_string())
            }
            Err(_) => {
                warn!(tool = name, "tool panicked");
                ToolResult::failure(format!("tool '{name}' panicked"))
            }
        }
    }
}
