//! `http_request`: generic outbound HTTP call.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::AgentryError;
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};

use super::truncate_utf8;

const BODY_MAX_BYTES: usize = 32_768;
const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

pub struct HttpRequest {
    client: reqwest::Client,
    parameters: AgentToolParameters,
}

impl HttpRequest {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            parameters: AgentToolParameters::object()
                .string("url", "Absolute http(s) URL", true)
                .string_enum("method", "HTTP method (default GET)", METHODS, false)
                .object("headers", "Request headers as a string map", false)
                .string("body", "Request body; JSON objects are sent as JSON", false)
                .build(),
        }
    }
}

#[async_trait]
impl Tool for HttpRequest {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Make an HTTP request and return the status code and response body."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<Value, AgentryError> {
        let url = parse_url(args.get_str("url")?)?;
        let method = parse_method(args.get_str_opt("method").unwrap_or("GET"))?;

        debug!(%method, %url, "http_request");

        let mut request = self.client.request(method, url);
        if let Some(headers) = args.get_object_opt("headers") {
            let headers: HashMap<&str, &str> = headers
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
                .collect();
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }
        request = match args.get_value_opt("body") {
            Some(Value::String(text)) => request.body(text.clone()),
            Some(other) => request.json(other),
            None => request,
        };

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let (body, truncated) = truncate_utf8(&text, BODY_MAX_BYTES);
        let body = if truncated {
            Value::String(body)
        } else {
            serde_json::from_str(&body).unwrap_or(Value::String(body))
        };

        Ok(json!({ "status": status, "body": body, "truncated": truncated }))
    }
}

fn parse_url(raw: &str) -> Result<Url, AgentryError> {
    let url = Url::parse(raw)
        .map_err(|e| AgentryError::InvalidArgument(format!("invalid url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AgentryError::InvalidArgument(format!(
            "unsupported url scheme '{other}'"
        ))),
    }
}

fn parse_method(raw: &str) -> Result<Method, AgentryError> {
    let upper = raw.to_ascii_uppercase();
    if !METHODS.contains(&upper.as_str()) {
        return Err(AgentryError::InvalidArgument(format!(
            "unsupported method '{raw}'"
        )));
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|e| AgentryError::InvalidArgument(e.to_string()))
}
