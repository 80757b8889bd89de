//! Model family routing and per-model pricing.

pub mod pricing;

pub use pricing::{ModelRates, PriceTable};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AgentryError;

const OPENAI_PREFIXES: &[&str] = &["gpt-", "chatgpt-", "o1", "o3", "o4"];
const ANTHROPIC_PREFIXES: &[&str] = &["claude-"];
const REASONING_PREFIXES: &[&str] = &["o1", "o3", "o4"];

/// The model families the gateway knows how to reach.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelFamily {
    OpenAi,
    Anthropic,
}

impl ModelFamily {
    /// Resolve the family serving `model` by identifier prefix.
    pub fn for_model(model: &str) -> Result<Self, AgentryError> {
        let model = model.trim();
        if Self::OpenAi.matches(model) {
            Ok(Self::OpenAi)
        } else if Self::Anthropic.matches(model) {
            Ok(Self::Anthropic)
        } else {
            Err(AgentryError::UnsupportedModel(model.to_string()))
        }
    }

    /// Whether `model` belongs to this family.
    pub fn matches(&self, model: &str) -> bool {
        let prefixes = match self {
            Self::OpenAi => OPENAI_PREFIXES,
            Self::Anthropic => ANTHROPIC_PREFIXES,
        };
        let model = model.trim();
        prefixes.iter().any(|p| model.starts_with(p))
    }
}

/// OpenAI o-series reasoning models. They take `max_completion_tokens` and
/// reject sampling parameters such as `temperature`.
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.trim();
    REASONING_PREFIXES.iter().any(|p| model.starts_with(p))
}
