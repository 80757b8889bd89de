//! Uniform outcome of one tool invocation.

use serde::{Deserialize, Serialize};

/// Result of one tool invocation. Produced once, never retried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Text fed back to the model as the observation.
    ///
    /// Failures are prefixed with `Error:` so the model can tell them apart.
    pub fn to_observation(&self) -> String {
        if self.success {
            match &self.data {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => "null".to_string(),
            }
        } else {
            format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("tool execution failed")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_observation_is_json_text() {
        let result = ToolResult::ok(json!({"status": 200}));
        assert_eq!(result.to_observation(), r#"{"status":200}"#);
        assert_eq!(ToolResult::ok(json!("plain")).to_observation(), "plain");
    }

    #[test]
    fn failure_observation_is_error_prefixed() {
        let result = ToolResult::failure("Unknown tool: nope");
        assert_eq!(result.to_observation(), "Error: Unknown tool: nope");
        assert!(!result.success);
    }
}
