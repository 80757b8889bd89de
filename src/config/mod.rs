//! Configuration system (layered: code > env > config file).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AgentryError;
use crate::models::{ModelRates, PriceTable};

/// Global default config (lazy-initialized from env and the default file).
static DEFAULT_CONFIG: OnceLock<AgentryConfig> = OnceLock::new();

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Gateway-wide defaults applied when a call does not set its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatewayDefaults {
    pub temperature: f64,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl Default for GatewayDefaults {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Layered configuration for Agentry.
///
/// Keys are looked up by provider or integration name: `openai`,
/// `anthropic`, `search`, `email`, `notification`. Explicit setters win over
/// environment variables, which win over the TOML file.
#[derive(Debug, Clone, Default)]
pub struct AgentryConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    settings: Arc<RwLock<HashMap<String, String>>>,
    defaults: GatewayDefaults,
    pricing: HashMap<String, ModelRates>,
}

const ENV_API_KEYS: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai"),
    ("ANTHROPIC_API_KEY", "anthropic"),
    ("SEARCH_API_KEY", "search"),
    ("EMAIL_API_KEY", "email"),
];

const ENV_BASE_URLS: &[(&str, &str)] = &[
    ("OPENAI_BASE_URL", "openai"),
    ("ANTHROPIC_BASE_URL", "anthropic"),
    ("SEARCH_BASE_URL", "search"),
    ("EMAIL_BASE_URL", "email"),
    ("NOTIFICATION_WEBHOOK_URL", "notification"),
];

const ENV_SETTINGS: &[(&str, &str)] = &[("EMAIL_FROM", "email_from")];

/// On-disk layout of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    api_keys: HashMap<String, String>,
    base_urls: HashMap<String, String>,
    settings: HashMap<String, String>,
    defaults: DefaultsSection,
    pricing: HashMap<String, ModelRates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DefaultsSection {
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    request_timeout_secs: Option<u64>,
}

impl AgentryConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (after reading `.env` if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let config = Self::new();
        config.apply_env();
        config
    }

    /// Parse a TOML config document.
    pub fn from_toml_str(raw: &str) -> Result<Self, AgentryError> {
        let file: ConfigFile = toml::from_str(raw)?;
        let mut config = Self::new();
        for (provider, key) in file.api_keys {
            config.set_api_key(&provider, key);
        }
        for (provider, url) in file.base_urls {
            config.set_base_url(&provider, url);
        }
        for (name, value) in file.settings {
            config.set_setting(&name, value);
        }
        if let Some(t) = file.defaults.temperature {
            config.defaults.temperature = t;
        }
        if let Some(max) = file.defaults.max_tokens {
            config.defaults.max_tokens = max;
        }
        if let Some(secs) = file.defaults.request_timeout_secs {
            config.defaults.request_timeout = Duration::from_secs(secs);
        }
        config.pricing = file.pricing;
        Ok(config)
    }

    /// Read a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AgentryError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Full layered load: file (explicit path, else the default path if it
    /// exists), then environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self, AgentryError> {
        let _ = dotenvy::dotenv();
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = default_config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    Self::new()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static AgentryConfig {
        DEFAULT_CONFIG.get_or_init(|| match Self::load(None) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable config file");
                Self::from_env()
            }
        })
    }

    fn apply_env(&self) {
        for (env_var, provider) in ENV_API_KEYS {
            if let Ok(key) = std::env::var(env_var) {
                self.set_api_key(provider, key);
            }
        }
        for (env_var, provider) in ENV_BASE_URLS {
            if let Ok(url) = std::env::var(env_var) {
                self.set_base_url(provider, url);
            }
        }
        for (env_var, name) in ENV_SETTINGS {
            if let Ok(value) = std::env::var(env_var) {
                self.set_setting(name, value);
            }
        }
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        if let Ok(mut keys) = self.api_keys.write() {
            keys.insert(provider.to_string(), key);
        }
    }

    /// Resolve an API key. Blank values count as unset.
    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys
            .read()
            .ok()?
            .get(provider)
            .filter(|k| !k.trim().is_empty())
            .cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        if let Ok(mut urls) = self.base_urls.write() {
            urls.insert(provider.to_string(), url);
        }
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls
            .read()
            .ok()?
            .get(provider)
            .map(|u| u.trim_end_matches('/').to_string())
    }

    pub fn set_setting(&self, name: &str, value: String) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(name.to_string(), value);
        }
    }

    pub fn get_setting(&self, name: &str) -> Option<String> {
        self.settings.read().ok()?.get(name).cloned()
    }

    /// Check if a provider or integration has credentials configured.
    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }

    pub fn defaults(&self) -> &GatewayDefaults {
        &self.defaults
    }

    pub fn with_defaults(mut self, defaults: GatewayDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// The built-in price table with any `[pricing]` overrides applied.
    pub fn price_table(&self) -> PriceTable {
        PriceTable::builtin().with_overrides(
            self.pricing
                .iter()
                .map(|(model, rates)| (model.clone(), *rates)),
        )
    }
}

/// `~/.agentry/config.toml`.
pub fn default_config_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".agentry"))
        .unwrap_or_else(|| PathBuf::from(".agentry"))
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Usage;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[api_keys]
openai = "sk-file"
search = "search-key"

[base_urls]
anthropic = "http://localhost:9000/v1/"

[settings]
email_from = "agents@example.com"

[defaults]
temperature = 0.2
max_tokens = 1024
request_timeout_secs = 15

[pricing.my-model]
input_per_million = 1.0
output_per_million = 2.0
"#;

    #[test]
    fn parses_all_sections() {
        let config = AgentryConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.get_api_key("openai"), Some("sk-file".to_string()));
        assert!(config.has_credentials("search"));
        assert_eq!(
            config.get_base_url("anthropic"),
            Some("http://localhost:9000/v1".to_string())
        );
        assert_eq!(
            config.get_setting("email_from"),
            Some("agents@example.com".to_string())
        );
        assert_eq!(config.defaults().temperature, 0.2);
        assert_eq!(config.defaults().max_tokens, 1024);
        assert_eq!(config.defaults().request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn pricing_overrides_reach_price_table() {
        let config = AgentryConfig::from_toml_str(SAMPLE).unwrap();
        let cost = config
            .price_table()
            .cost("my-model", &Usage::new(1_000_000, 1_000_000));
        assert!((cost - 3.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_setter_overrides_file_value() {
        let config = AgentryConfig::from_toml_str(SAMPLE).unwrap();
        config.set_api_key("openai", "sk-explicit".to_string());
        assert_eq!(config.get_api_key("openai"), Some("sk-explicit".to_string()));
    }

    #[test]
    fn blank_key_is_treated_as_missing() {
        let config = AgentryConfig::new();
        config.set_api_key("email", "   ".to_string());
        assert!(!config.has_credentials("email"));
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = AgentryConfig::from_file(&path).unwrap();
        assert_eq!(config.get_api_key("search"), Some("search-key".to_string()));
    }

    #[test]
    fn malformed_file_is_config_error() {
        let err = AgentryConfig::from_toml_str("[api_keys\nopenai = 1").unwrap_err();
        assert!(matches!(err, AgentryError::ConfigFile(_)));
    }

    #[test]
    fn defaults_match_gateway_contract() {
        let defaults = GatewayDefaults::default();
        assert_eq!(defaults.temperature, 0.7);
        assert_eq!(defaults.max_tokens, 4096);
    }
}
