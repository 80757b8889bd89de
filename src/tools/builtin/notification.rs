//! `send_notification`: post a message to a chat webhook.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AgentryConfig;
use crate::error::AgentryError;
use crate::provider::http::error_for_response;
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};

use super::not_configured;

pub struct SendNotification {
    webhook_url: Option<String>,
    client: reqwest::Client,
    parameters: AgentToolParameters,
}

impl SendNotification {
    pub fn new(webhook_url: Option<String>, client: reqwest::Client) -> Self {
        Self {
            webhook_url,
            client,
            parameters: AgentToolParameters::object()
                .string("message", "Notification text", true)
                .string("channel", "Optional channel override", false)
                .build(),
        }
    }

    pub fn from_config(config: &AgentryConfig, client: reqwest::Client) -> Self {
        Self::new(config.get_base_url("notification"), client)
    }
}

#[async_trait]
impl Tool for SendNotification {
    fn name(&self) -> &str {
        "send_notification"
    }

    fn description(&self) -> &str {
        "Send a short notification message to the team chat channel."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<Value, AgentryError> {
        let message = args.get_str("message")?;
        // An agent may carry its own webhook.
        let webhook = ctx
            .config_str("webhook_url")
            .map(str::to_string)
            .or_else(|| self.webhook_url.clone());
        let Some(webhook) = webhook else {
            return Ok(not_configured(self.name(), "set NOTIFICATION_WEBHOOK_URL"));
        };

        let mut payload = json!({ "text": message });
        if let Some(channel) = args.get_str_opt("channel").or(ctx.config_str("channel")) {
            payload["channel"] = Value::String(channel.to_string());
        }

        debug!("send_notification");

        let resp = self.client.post(&webhook).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(error_for_response(resp).await);
        }

        Ok(json!({ "status": "sent" }))
    }
}
