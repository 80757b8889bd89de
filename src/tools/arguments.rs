//! Typed access to tool call arguments.

use crate::error::AgentryError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, AgentryError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentryError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an optional unsigned integer argument.
    pub fn get_u64_opt(&self, key: &str) -> Option<u64> {
        self.value.get(key).and_then(|v| v.as_u64())
    }

    /// Get an optional nested object.
    pub fn get_object_opt(&self, key: &str) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.value.get(key).and_then(|v| v.as_object())
    }

    /// Get an optional value of any JSON type.
    pub fn get_value_opt(&self, key: &str) -> Option<&serde_json::Value> {
        self.value.get(key).filter(|v| !v.is_null())
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, AgentryError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            AgentryError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
