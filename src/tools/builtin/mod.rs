//! Built-in tools backed by external integrations.
//!
//! Every tool degrades to a `not_configured` payload (still a success) when
//! its credential or endpoint is missing, so a half-configured deployment
//! never fails an execution just by exposing a tool.
//!
//! ```rust,no_run
//! use agentry::config::AgentryConfig;
//! use agentry::tools::builtin::all_tools;
//!
//! let tools = all_tools(&AgentryConfig::from_env()).unwrap();
//! assert_eq!(tools.len(), 4);
//! ```

pub mod email;
pub mod http_request;
pub mod notification;
pub mod search;

pub use email::SendEmail;
pub use http_request::HttpRequest;
pub use notification::SendNotification;
pub use search::WebSearch;

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::AgentryConfig;
use crate::error::AgentryError;
use crate::provider::http::build_client;
use crate::tools::Tool;

/// Build every built-in tool from `config`.
pub fn all_tools(config: &AgentryConfig) -> Result<Vec<Arc<dyn Tool>>, AgentryError> {
    let client = build_client(config.defaults().request_timeout)?;
    Ok(vec![
        Arc::new(WebSearch::from_config(config, client.clone())),
        Arc::new(SendEmail::from_config(config, client.clone())),
        Arc::new(HttpRequest::new(client.clone())),
        Arc::new(SendNotification::from_config(config, client)),
    ])
}

/// Payload returned when an integration is missing its credential/endpoint.
pub(crate) fn not_configured(tool: &str, hint: &str) -> Value {
    json!({
        "status": "not_configured",
        "tool": tool,
        "message": format!("{tool} is not configured: {hint}"),
    })
}

/// Truncate to at most `max_bytes` without splitting a UTF-8 character.
pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> (String, bool) {
    if s.len() <= max_bytes {
        return (s.to_string(), false);
    }
    let mut cutoff = max_bytes;
    while cutoff > 0 && !s.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    (s[..cutoff].to_string(), true)
}
