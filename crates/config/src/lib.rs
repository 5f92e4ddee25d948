//! Configuration loading, validation, and management for Mastermind.
//!
//! Loads configuration from `~/.mastermind/config.toml` with environment
//! variable overrides. Validates all settings at startup.

pub mod defaults;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.mastermind/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default completion provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per answer
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Card database settings
    #[serde(default)]
    pub card_data: CardDataConfig,

    /// Grounding sources and answer style
    #[serde(default)]
    pub grounding: GroundingConfig,
}

fn default_provider() -> String {
    "deepseek".into()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("providers", &self.providers)
            .field("card_data", &self.card_data)
            .field("grounding", &self.grounding)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDataConfig {
    #[serde(default = "default_card_data_url")]
    pub base_url: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_card_data_timeout")]
    pub timeout_secs: u64,

    /// How long fetched rulings stay fresh
    #[serde(default = "default_rulings_ttl")]
    pub rulings_ttl_secs: u64,
}

fn default_card_data_url() -> String {
    "https://api.scryfall.com".into()
}
fn default_card_data_timeout() -> u64 {
    5
}
fn default_rulings_ttl() -> u64 {
    3600
}

impl CardDataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rulings_ttl(&self) -> Duration {
        Duration::from_secs(self.rulings_ttl_secs)
    }
}

impl Default for CardDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_card_data_url(),
            timeout_secs: default_card_data_timeout(),
            rulings_ttl_secs: default_rulings_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingConfig {
    /// Plain-text Comprehensive Rules, one rule per line
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,

    /// Maximum rules-corpus lines per answer
    #[serde(default = "default_snippet_limit")]
    pub snippet_limit: usize,

    #[serde(default = "default_persona")]
    pub persona: String,

    #[serde(default = "default_guidelines")]
    pub guidelines: String,

    #[serde(default = "default_vocabulary")]
    pub vocabulary: String,

    /// Override rulings keyed by exact card name. Replaces the built-in table when set.
    #[serde(default = "defaults::special_cases")]
    pub special_cases: BTreeMap<String, String>,
}

fn default_rules_path() -> PathBuf {
    PathBuf::from("rules.txt")
}
fn default_snippet_limit() -> usize {
    30
}
fn default_persona() -> String {
    defaults::PERSONA.into()
}
fn default_guidelines() -> String {
    defaults::GUIDELINES.into()
}
fn default_vocabulary() -> String {
    defaults::VOCABULARY.into()
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            rules_path: default_rules_path(),
            snippet_limit: default_snippet_limit(),
            persona: default_persona(),
            guidelines: default_guidelines(),
            vocabulary: default_vocabulary(),
            special_cases: defaults::special_cases(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.mastermind/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `MASTERMIND_API_KEY` (highest priority)
    /// - `DEEPSEEK_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("MASTERMIND_API_KEY")
                .ok()
                .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("MASTERMIND_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("MASTERMIND_MODEL") {
            config.default_model = model;
        }

        if let Ok(path) = std::env::var("MASTERMIND_RULES_PATH") {
            config.grounding.rules_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".mastermind")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.card_data.rulings_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "card_data.rulings_ttl_secs must be > 0".into(),
            ));
        }

        if self.card_data.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "card_data.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            providers: HashMap::new(),
            card_data: CardDataConfig::default(),
            grounding: GroundingConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
