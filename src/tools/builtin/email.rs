//! `send_email`: send a plain-text email through a JSON email API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AgentryConfig;
use crate::error::AgentryError;
use crate::provider::http::{bearer_headers, error_for_response};
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};

use super::not_configured;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

pub struct SendEmail {
    api_key: Option<String>,
    base_url: String,
    default_from: Option<String>,
    client: reqwest::Client,
    parameters: AgentToolParameters,
}

impl SendEmail {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        default_from: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_from,
            client,
            parameters: AgentToolParameters::object()
                .string("to", "Recipient email address", true)
                .string("subject", "Subject line", true)
                .string("body", "Plain-text message body", true)
                .build(),
        }
    }

    pub fn from_config(config: &AgentryConfig, client: reqwest::Client) -> Self {
        Self::new(
            config.get_api_key("email"),
            config.get_base_url("email"),
            config.get_setting("email_from"),
            client,
        )
    }
}

#[async_trait]
impl Tool for SendEmail {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send a plain-text email to a single recipient."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<Value, AgentryError> {
        let to = args.get_str("to")?;
        let subject = args.get_str("subject")?;
        let body = args.get_str("body")?;
        let Some(api_key) = &self.api_key else {
            return Ok(not_configured(self.name(), "set EMAIL_API_KEY"));
        };
        // Per-agent sender wins over the deployment default.
        let from = ctx
            .config_str("from")
            .map(str::to_string)
            .or_else(|| self.default_from.clone());
        let Some(from) = from else {
            return Ok(not_configured(self.name(), "set EMAIL_FROM"));
        };

        debug!(to, "send_email");

        let resp = self
            .client
            .post(format!("{}/emails", self.base_url))
            .headers(bearer_headers(api_key))
            .json(&json!({
                "from": from,
                "to": [to],
                "subject": subject,
                "text": body,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_response(resp).await);
        }

        let sent: SentEmail = resp.json().await?;
        Ok(json!({ "status": "sent", "id": sent.id, "to": to }))
    }
}

#[derive(Deserialize)]
struct SentEmail {
    #[serde(default)]
    id: Option<String>,
}
