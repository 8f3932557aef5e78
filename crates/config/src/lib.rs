//! Configuration loading, validation, and management for Colloquy.
//!
//! Loads configuration from `~/.colloquy/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default public holiday feed used when no override is configured.
pub const DEFAULT_HOLIDAYS_FEED_URL: &str = "https://www.officeholidays.com/ics/spain/catalonia";

/// The root configuration structure.
///
/// Maps directly to `~/.colloquy/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used for replies
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used for title generation
    #[serde(default = "default_title_model")]
    pub title_model: String,

    /// Sampling temperature; provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Upper bound on completion calls per reply
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,

    /// Tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Conversation store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4.1".into()
}
fn default_title_model() -> String {
    "gpt-4-turbo".into()
}
fn default_max_tool_iterations() -> u32 {
    15
}

/// Redact a secret for Debug output.
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
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("title_model", &self.title_model)
            .field("temperature", &self.temperature)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("tools", &self.tools)
            .field("store", &self.store)
            .finish()
    }
}

/// Per-tool settings. A tool whose API key is missing is not registered.
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_api_key: Option<String>,

    #[serde(default = "default_holidays_feed_url")]
    pub holidays_feed_url: String,

    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    #[serde(default = "default_stock_api_url")]
    pub stock_api_url: String,
}

fn default_holidays_feed_url() -> String {
    DEFAULT_HOLIDAYS_FEED_URL.into()
}
fn default_weather_api_url() -> String {
    "https://api.weatherapi.com/v1".into()
}
fn default_stock_api_url() -> String {
    "https://www.alphavantage.co".into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            stock_api_key: None,
            holidays_feed_url: default_holidays_feed_url(),
            weather_api_url: default_weather_api_url(),
            stock_api_url: default_stock_api_url(),
        }
    }
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("weather_api_key", &redact(&self.weather_api_key))
            .field("stock_api_key", &redact(&self.stock_api_key))
            .field("holidays_feed_url", &self.holidays_feed_url)
            .field("weather_api_url", &self.weather_api_url)
            .field("stock_api_url", &self.stock_api_url)
            .finish()
    }
}

/// Which conversation store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Directory for the file backend; `~/.colloquy/conversations` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::File
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// The directory the file backend writes to.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("conversations"))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.colloquy/config.toml).
    ///
    /// Environment variables then override the file:
    /// - `COLLOQUY_API_KEY`, then `OPENAI_API_KEY`
    /// - `COLLOQUY_API_URL`, `COLLOQUY_MODEL`
    /// - `WEATHER_API_KEY`, `STOCK_API_KEY`, `HOLIDAY_CALENDAR_LINK`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
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

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("COLLOQUY_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = var("COLLOQUY_API_URL") {
            self.api_url = url;
        }
        if let Some(model) = var("COLLOQUY_MODEL") {
            self.model = model;
        }
        if let Some(key) = var("WEATHER_API_KEY") {
            self.tools.weather_api_key = Some(key);
        }
        if let Some(key) = var("STOCK_API_KEY") {
            self.tools.stock_api_key = Some(key);
        }
        if let Some(link) = var("HOLIDAY_CALENDAR_LINK") {
            self.tools.holidays_feed_url = link;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".colloquy")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_tool_iterations must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if a completion API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The effective configuration as TOML with every secret replaced.
    pub fn redacted_toml(&self) -> String {
        let mut shown = self.clone();
        let mask = |s: &mut Option<String>| {
            if s.is_some() {
                *s = Some("[REDACTED]".into());
            }
        };
        mask(&mut shown.api_key);
        mask(&mut shown.tools.weather_api_key);
        mask(&mut shown.tools.stock_api_key);
        toml::to_string_pretty(&shown).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            title_model: default_title_model(),
            temperature: None,
            max_tool_iterations: default_max_tool_iterations(),
            tools: ToolsConfig::default(),
            store: StoreConfig::default(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tool_iterations, 15);
        assert_eq!(config.tools.holidays_feed_url, DEFAULT_HOLIDAYS_FEED_URL);
        assert_eq!(config.store.backend, StoreBackend::File);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.tools.weather_api_url, config.tools.weather_api_url);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: Some(5.0),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = AppConfig {
            max_tool_iterations: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert!(config.tools.weather_api_key.is_none());
    }

    #[test]
    fn load_from_file_with_tool_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "gpt-4o-mini"

[tools]
stock_api_key = "demo"
holidays_feed_url = "https://example.com/holidays.ics"

[store]
backend = "memory"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.tools.stock_api_key.as_deref(), Some("demo"));
        assert_eq!(config.tools.holidays_feed_url, "https://example.com/holidays.ics");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.max_tool_iterations, 15);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("WEATHER_API_KEY", "weather-key"),
            ("STOCK_API_KEY", ""),
            ("HOLIDAY_CALENDAR_LINK", "https://example.com/cal.ics"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.tools.weather_api_key.as_deref(), Some("weather-key"));
        assert!(config.tools.stock_api_key.is_none());
        assert_eq!(config.tools.holidays_feed_url, "https://example.com/cal.ics");
    }

    #[test]
    fn colloquy_key_takes_priority() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(lookup(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("COLLOQUY_API_KEY", "sk-colloquy"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-colloquy"));
    }

    #[test]
    fn debug_and_toml_redact_secrets() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-secret".into());
        config.tools.weather_api_key = Some("weather-secret".into());

        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("weather-secret"));

        let shown = config.redacted_toml();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("[REDACTED]"));
    }
}
