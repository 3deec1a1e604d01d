//! Configuration loading, validation, and management for websearch.
//!
//! Loads configuration from `~/.websearch/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use websearch_core::credentials::{Credentials, SERPAPI_SECRET};
use websearch_core::prompt::PromptPosition;

/// Template used when the configured one is empty.
pub const DEFAULT_INSERTION_TEMPLATE: &str =
    "***\nRelevant information from the web ({{query}}):\n{{text}}\n***";

const DEFAULT_TRIGGER_PHRASES: &[&str] = &[
    "tell me",
    "explain me",
    "can you",
    "how to",
    "how is",
    "how do you",
    "ways to",
    "who is",
    "who are",
    "who was",
    "who were",
    "who did",
    "what is",
    "what's",
    "what are",
    "what're",
    "what was",
    "what were",
    "what did",
    "what do",
    "where are",
    "where're",
    "where's",
    "where is",
    "where was",
    "where were",
    "where did",
    "where do",
    "where does",
    "where can",
    "how do i",
    "where do i",
    "how much",
    "definition of",
    "what happened",
    "why does",
    "why do",
    "why did",
    "why is",
    "why are",
    "why were",
    "when does",
    "when do",
    "when did",
    "when is",
    "when was",
    "when were",
    "how does",
    "meaning of",
];

/// The root configuration structure.
///
/// Maps directly to `~/.websearch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline behaviour (what the settings panel used to edit)
    #[serde(default)]
    pub websearch: WebSearchSettings,

    /// Search provider endpoint and credentials
    #[serde(default)]
    pub search: SearchConfig,

    /// Cache backend selection
    #[serde(default)]
    pub cache: CacheConfig,

    /// Values for the `{{name}}` macro pass run over injected text
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub macros: BTreeMap<String, String>,
}

/// A snapshot of the pipeline settings.
///
/// The pipeline never holds on to one of these between turns: callers hand
/// it a fresh value on every invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Checked in order; the first phrase found anywhere in the message wins.
    #[serde(default = "default_trigger_phrases")]
    pub trigger_phrases: Vec<String>,

    /// Uses `{{query}}` and `{{text}}`.
    #[serde(default = "default_insertion_template")]
    pub insertion_template: String,

    #[serde(default = "default_cache_lifetime_secs")]
    pub cache_lifetime_secs: u64,

    /// `before_main` / `after_main` / `in_chat`, or the host code 2 / 0 / 1.
    #[serde(default)]
    pub position: PromptPosition,

    /// Only used when `position` is `in_chat`.
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Maximum words kept in a query, starting at the trigger phrase.
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Soft cap on extracted characters.
    #[serde(default = "default_budget_chars")]
    pub budget_chars: usize,
}

fn default_trigger_phrases() -> Vec<String> {
    DEFAULT_TRIGGER_PHRASES.iter().map(|p| p.to_string()).collect()
}
fn default_insertion_template() -> String {
    DEFAULT_INSERTION_TEMPLATE.into()
}
fn default_cache_lifetime_secs() -> u64 {
    60 * 60 * 24 * 7
}
fn default_depth() -> u32 {
    2
}
fn default_max_words() -> usize {
    10
}
fn default_budget_chars() -> usize {
    1500
}

impl WebSearchSettings {
    /// Cache lifetime in milliseconds, saturating instead of overflowing.
    pub fn cache_lifetime_ms(&self) -> i64 {
        i64::try_from(self.cache_lifetime_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger_phrases: default_trigger_phrases(),
            insertion_template: default_insertion_template(),
            cache_lifetime_secs: default_cache_lifetime_secs(),
            position: PromptPosition::default(),
            depth: default_depth(),
            max_words: default_max_words(),
            budget_chars: default_budget_chars(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Endpoint that accepts `POST {"query": ...}` and returns SerpApi-shaped JSON
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Deadline for one search request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8000/api/serpapi/search".into()
}
fn default_timeout_secs() -> u64 {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// "sqlite", "file" or "memory"
    #[serde(default = "default_cache_backend")]
    pub backend: String,

    /// Override the store location (defaults under the config directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_cache_backend() -> String {
    "sqlite".into()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            path: None,
        }
    }
}

impl CacheConfig {
    /// Where the configured backend keeps its data.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        match self.backend.as_str() {
            "file" => AppConfig::config_dir().join("cache.jsonl"),
            _ => AppConfig::config_dir().join("cache.sqlite"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.websearch/config.toml).
    ///
    /// Also checks environment variables:
    /// - `WEBSEARCH_API_KEY` (highest priority), then `SERPAPI_API_KEY`
    /// - `WEBSEARCH_ENDPOINT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment variable overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
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

    /// Apply overrides from a variable lookup (the process environment in production).
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("WEBSEARCH_API_KEY").or_else(|| non_empty("SERPAPI_API_KEY")) {
            self.search.api_key = Some(key);
        }

        if let Some(endpoint) = non_empty("WEBSEARCH_ENDPOINT") {
            self.search.endpoint = endpoint.trim().to_string();
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".websearch")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.websearch.max_words == 0 {
            return Err(ConfigError::ValidationError(
                "websearch.max_words must be at least 1".into(),
            ));
        }

        if self.search.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "search.endpoint must not be empty".into(),
            ));
        }

        if self.search.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "search.timeout_secs must be > 0".into(),
            ));
        }

        if !matches!(self.cache.backend.as_str(), "sqlite" | "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "cache.backend must be one of sqlite, file, memory (got {:?})",
                self.cache.backend
            )));
        }

        Ok(())
    }

    /// Check if a search API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.search
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Credentials for AppConfig {
    fn has_secret(&self, name: &str) -> bool {
        name == SERPAPI_SECRET && self.has_api_key()
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.websearch.enabled);
        assert_eq!(config.websearch.trigger_phrases.len(), 49);
        assert_eq!(config.websearch.trigger_phrases[0], "tell me");
        assert_eq!(config.websearch.cache_lifetime_secs, 604_800);
        assert_eq!(config.websearch.position, PromptPosition::AfterMain);
        assert_eq!(config.websearch.depth, 2);
        assert_eq!(config.websearch.max_words, 10);
        assert_eq!(config.websearch.budget_chars, 1500);
        assert_eq!(config.cache.backend, "sqlite");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.websearch, config.websearch);
        assert_eq!(parsed.search.endpoint, config.search.endpoint);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let toml_str = r#"
[websearch]
enabled = true
position = "in_chat"
depth = 4
trigger_phrases = ["look up"]

[macros]
user = "Alice"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.websearch.enabled);
        assert_eq!(config.websearch.position, PromptPosition::InChat);
        assert_eq!(config.websearch.depth, 4);
        assert_eq!(config.websearch.trigger_phrases, vec!["look up".to_string()]);
        assert_eq!(config.websearch.max_words, 10);
        assert_eq!(config.websearch.insertion_template, DEFAULT_INSERTION_TEMPLATE);
        assert_eq!(config.macros.get("user").map(String::as_str), Some("Alice"));
    }

    #[test]
    fn position_accepts_host_code() {
        let config: AppConfig = toml::from_str("[websearch]\nposition = 1\n").unwrap();
        assert_eq!(config.websearch.position, PromptPosition::InChat);

        let config: AppConfig = toml::from_str("[websearch]\nposition = 2\n").unwrap();
        assert_eq!(config.websearch.position, PromptPosition::BeforeMain);

        assert!(toml::from_str::<AppConfig>("[websearch]\nposition = 9\n").is_err());
    }

    #[test]
    fn zero_max_words_rejected() {
        let mut config = AppConfig::default();
        config.websearch.max_words = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_cache_backend_rejected() {
        let mut config = AppConfig::default();
        config.cache.backend = "redis".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().websearch.max_words, 10);
    }

    #[test]
    fn load_from_file_parses_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[websearch]\nmax_words = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));

        std::fs::write(&path, "[websearch\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_key_and_endpoint() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SERPAPI_API_KEY", "serp-key"),
            ("WEBSEARCH_ENDPOINT", " http://search.local/api "),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.search.api_key.as_deref(), Some("serp-key"));
        assert_eq!(config.search.endpoint, "http://search.local/api");
    }

    #[test]
    fn websearch_key_wins_over_serpapi_key() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SERPAPI_API_KEY", "serp-key"),
            ("WEBSEARCH_API_KEY", "ws-key"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.search.api_key.as_deref(), Some("ws-key"));
    }

    #[test]
    fn credentials_follow_api_key() {
        let mut config = AppConfig::default();
        assert!(!config.has_secret(SERPAPI_SECRET));

        config.search.api_key = Some("   ".into());
        assert!(!config.has_secret(SERPAPI_SECRET));

        config.search.api_key = Some("real".into());
        assert!(config.has_secret(SERPAPI_SECRET));
        assert!(!config.has_secret("some_other_secret"));
    }

    #[test]
    fn api_key_redacted_in_debug() {
        let mut config = AppConfig::default();
        config.search.api_key = Some("super-secret".into());
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn cache_lifetime_ms_saturates() {
        let settings = WebSearchSettings {
            cache_lifetime_secs: u64::MAX,
            ..WebSearchSettings::default()
        };
        assert_eq!(settings.cache_lifetime_ms(), i64::MAX);
        assert_eq!(WebSearchSettings::default().cache_lifetime_ms(), 604_800_000);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("[websearch]"));
        assert!(toml_str.contains("how to"));
        assert!(toml_str.contains("after_main"));
    }

    #[test]
    fn resolved_cache_path_follows_backend() {
        let file = CacheConfig {
            backend: "file".into(),
            path: None,
        };
        assert!(file.resolved_path().ends_with("cache.jsonl"));

        let custom = CacheConfig {
            backend: "sqlite".into(),
            path: Some(PathBuf::from("/tmp/x.sqlite")),
        };
        assert_eq!(custom.resolved_path(), PathBuf::from("/tmp/x.sqlite"));
    }
}
