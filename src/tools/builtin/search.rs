//! `web_search`: query a web search API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AgentryConfig;
use crate::error::AgentryError;
use crate::provider::http::error_for_response;
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};

use super::not_configured;

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1";
const DEFAULT_COUNT: u64 = 5;
const MAX_COUNT: u64 = 20;

pub struct WebSearch {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
    parameters: AgentToolParameters,
}

impl WebSearch {
    pub fn new(api_key: Option<String>, base_url: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
            parameters: AgentToolParameters::object()
                .string("query", "The search query", true)
                .integer("count", "Maximum number of results (default 5)", false)
                .build(),
        }
    }

    pub fn from_config(config: &AgentryConfig, client: reqwest::Client) -> Self {
        Self::new(
            config.get_api_key("search"),
            config.get_base_url("search"),
            client,
        )
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web and return the top results with titles, URLs, and snippets."
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
        _ctx: &ToolExecutionContext,
    ) -> Result<Value, AgentryError> {
        let query = args.get_str("query")?;
        let Some(api_key) = &self.api_key else {
            return Ok(not_configured(self.name(), "set SEARCH_API_KEY"));
        };
        let count = args
            .get_u64_opt("count")
            .unwrap_or(DEFAULT_COUNT)
            .clamp(1, MAX_COUNT);

        debug!(query, count, "web_search");
        let count_param = count.to_string();

        let resp = self
            .client
            .get(format!("{}/web/search", self.base_url))
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count_param.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_response(resp).await);
        }

        let data: SearchResponse = resp.json().await?;
        let results: Vec<Value> = data
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .take(count as usize)
            .map(|r| json!({ "title": r.title, "url": r.url, "snippet": r.description }))
            .collect();

        Ok(json!({ "query": query, "results": results }))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    web: Option<SearchWeb>,
}

#[derive(Deserialize)]
struct SearchWeb {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}
