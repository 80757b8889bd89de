//! Agent definitions.

use std::path::Path;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::AgentryError;

pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Immutable configuration for one agent.
///
/// ```
/// use agentry::agent::AgentConfig;
///
/// let agent = AgentConfig::builder()
///     .id("support-bot")
///     .system_prompt("You answer support questions.")
///     .model("gpt-4o-mini")
///     .build();
/// assert_eq!(agent.max_iterations, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct AgentConfig {
    #[builder(into)]
    pub id: String,
    #[serde(default)]
    #[builder(into, default)]
    pub name: String,
    #[builder(into)]
    pub system_prompt: String,
    /// Model identifier; selects the provider.
    #[builder(into)]
    pub model: String,
    #[serde(default = "default_max_iterations")]
    #[builder(default = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,
    #[serde(default = "default_timeout_seconds")]
    #[builder(default = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,
    /// Falls back to the gateway default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Tool names are expected to be unique; the engine does not check.
    #[serde(default)]
    #[builder(default)]
    pub tools: Vec<AttachedTool>,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl AgentConfig {
    /// Parse an agent definition from TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self, AgentryError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AgentryError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// The attached tool called `name`, if any.
    pub fn tool(&self, name: &str) -> Option<&AttachedTool> {
        self.tools.iter().find(|t| t.name == name)
    }
}

/// A tool attached to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedTool {
    pub name: String,
    /// Overrides the registered tool's description in prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema; the registered tool's schema is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    /// Per-agent configuration handed to the tool on every call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl AttachedTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: None,
            config: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Who an execution runs on behalf of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl CallerIdentity {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}
