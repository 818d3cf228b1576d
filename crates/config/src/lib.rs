//! Configuration loading, validation, and management for Nova.
//!
//! Loads configuration from `~/.nova/config.toml` with environment
//! variable overrides. Configuration is immutable for the duration of a
//! session except through the explicit switch methods, which validate
//! before mutating.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which LLM backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini over HTTPS
    Gemini,
    /// A local Ollama server
    Ollama,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ConfigError::ValidationError(format!(
                "unknown provider '{other}' (expected 'gemini' or 'ollama')"
            ))),
        }
    }
}

/// The root configuration structure.
///
/// Maps directly to `~/.nova/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Active LLM provider
    #[serde(default = "default_provider_kind")]
    pub provider: ProviderKind,

    /// Model used when the Gemini provider is active
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Model used when the Ollama provider is active
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Base URL of the local Ollama server
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,

    /// Hard cap on transcript length before the window applies
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,

    /// Number of non-system messages the sliding window retains
    #[serde(default = "default_sliding_window")]
    pub sliding_window_size: usize,

    /// Maximum tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub max_tokens_per_message: u32,

    /// Maximum tool-call rounds per user turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    /// Default timeout for the run_command tool, in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Root directory tools resolve paths against
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// Name the assistant uses to address the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_provider_kind() -> ProviderKind {
    ProviderKind::Gemini
}
fn default_gemini_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_ollama_model() -> String {
    "llama3.2".into()
}
fn default_ollama_host() -> String {
    "http://localhost:11434".into()
}
fn default_max_context_messages() -> usize {
    50
}
fn default_sliding_window() -> usize {
    20
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_max_tool_rounds() -> usize {
    8
}
fn default_command_timeout() -> u64 {
    30
}
fn default_project_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
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
            .field("provider", &self.provider)
            .field("gemini_model", &self.gemini_model)
            .field("ollama_model", &self.ollama_model)
            .field("ollama_host", &self.ollama_host)
            .field("max_context_messages", &self.max_context_messages)
            .field("sliding_window_size", &self.sliding_window_size)
            .field("max_tokens_per_message", &self.max_tokens_per_message)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .field("project_root", &self.project_root)
            .field("user_name", &self.user_name)
            .field("memory", &self.memory)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Whether long-term memory is active at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Extract and store a memory after each completed turn
    #[serde(default = "default_true")]
    pub auto_extract: bool,

    /// How many memories to recall at session start
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Path to the memory file (default: ~/.nova/memories.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}
fn default_search_limit() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_extract: true,
            search_limit: default_search_limit(),
            path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.nova/config.toml).
    ///
    /// Environment variables override file values:
    /// - `GEMINI_API_KEY` / `GOOGLE_API_KEY` — API key
    /// - `OLLAMA_HOST` — Ollama base URL
    /// - `OLLAMA_MODEL` — Ollama model
    /// - `NOVA_MODEL` — active model for the selected provider
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("GEMINI_API_KEY")
                .ok()
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok());
        }

        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            config.ollama_host = host;
        }

        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.ollama_model = model;
        }

        if let Ok(model) = std::env::var("NOVA_MODEL") {
            match config.provider {
                ProviderKind::Gemini => config.gemini_model = model,
                ProviderKind::Ollama => config.ollama_model = model,
            }
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

        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".nova")
    }

    /// Path of the memory file, honoring the configured override.
    pub fn memory_path(&self) -> PathBuf {
        self.memory
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("memories.json"))
    }

    /// The model for the currently active provider.
    pub fn current_model(&self) -> &str {
        match self.provider {
            ProviderKind::Gemini => &self.gemini_model,
            ProviderKind::Ollama => &self.ollama_model,
        }
    }

    /// Switch the active provider. Validates the name before mutating.
    pub fn switch_provider(&mut self, name: &str) -> Result<ProviderKind, ConfigError> {
        let kind: ProviderKind = name.parse()?;
        if kind == ProviderKind::Gemini && self.api_key.is_none() {
            return Err(ConfigError::ValidationError(
                "cannot switch to gemini: no API key configured (set GEMINI_API_KEY)".into(),
            ));
        }
        self.provider = kind;
        Ok(kind)
    }

    /// Switch the active model.
    ///
    /// Names starting with "gemini" imply the Gemini provider; anything
    /// else sets the model for the currently active provider.
    pub fn switch_model(&mut self, model: &str) -> Result<(), ConfigError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(ConfigError::ValidationError("model name is empty".into()));
        }
        if model.starts_with("gemini") {
            self.switch_provider("gemini")?;
            self.gemini_model = model.to_string();
        } else {
            match self.provider {
                ProviderKind::Gemini => self.gemini_model = model.to_string(),
                ProviderKind::Ollama => self.ollama_model = model.to_string(),
            }
        }
        Ok(())
    }

    /// Check the configuration, returning every issue found.
    ///
    /// An empty vec means the config is usable. Issues are reported to the
    /// user at startup; the provider is not constructed until they are
    /// resolved.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.provider == ProviderKind::Gemini && self.api_key.is_none() {
            issues.push(
                "provider is 'gemini' but no API key is configured (set GEMINI_API_KEY)".into(),
            );
        }

        if self.current_model().trim().is_empty() {
            issues.push(format!("no model configured for provider '{}'", self.provider));
        }

        if self.provider == ProviderKind::Ollama && self.ollama_host.trim().is_empty() {
            issues.push("ollama_host is empty".into());
        }

        if self.sliding_window_size == 0 {
            issues.push("sliding_window_size must be at least 1".into());
        }

        if self.sliding_window_size > self.max_context_messages {
            issues.push(format!(
                "sliding_window_size ({}) exceeds max_context_messages ({})",
                self.sliding_window_size, self.max_context_messages
            ));
        }

        if self.max_tool_rounds == 0 {
            issues.push("max_tool_rounds must be at least 1".into());
        }

        if !self.project_root.exists() {
            issues.push(format!(
                "project_root does not exist: {}",
                self.project_root.display()
            ));
        }

        issues
    }

    /// Generate a default config TOML string (for first-run onboarding).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider_kind(),
            gemini_model: default_gemini_model(),
            ollama_model: default_ollama_model(),
            ollama_host: default_ollama_host(),
            max_context_messages: default_max_context_messages(),
            sliding_window_size: default_sliding_window(),
            max_tokens_per_message: default_max_tokens(),
            max_tool_rounds: default_max_tool_rounds(),
            command_timeout_secs: default_command_timeout(),
            project_root: default_project_root(),
            user_name: None,
            memory: MemoryConfig::default(),
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

    fn with_key() -> AppConfig {
        AppConfig {
            api_key: Some("test-key".into()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn default_config_shape() {
        let config = AppConfig::default();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.sliding_window_size, 20);
        assert_eq!(config.max_tool_rounds, 8);
        assert_eq!(config.command_timeout_secs, 30);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = with_key();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.gemini_model, config.gemini_model);
        assert_eq!(parsed.api_key, config.api_key);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().provider, ProviderKind::Gemini);
    }

    #[test]
    fn validate_flags_missing_gemini_key() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("API key")));
    }

    #[test]
    fn validate_clean_config_has_no_issues() {
        let mut config = with_key();
        config.project_root = std::env::temp_dir();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validate_flags_window_larger_than_context_cap() {
        let mut config = with_key();
        config.project_root = std::env::temp_dir();
        config.max_context_messages = 10;
        config.sliding_window_size = 30;
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("max_context_messages")));
    }

    #[test]
    fn switch_provider_rejects_unknown_name() {
        let mut config = with_key();
        assert!(config.switch_provider("claude").is_err());
        assert_eq!(config.provider, ProviderKind::Gemini);
    }

    #[test]
    fn switch_provider_to_gemini_requires_key() {
        let mut config = AppConfig {
            provider: ProviderKind::Ollama,
            ..AppConfig::default()
        };
        assert!(config.switch_provider("gemini").is_err());
        assert_eq!(config.provider, ProviderKind::Ollama);
    }

    #[test]
    fn switch_model_gemini_prefix_implies_provider() {
        let mut config = with_key();
        config.provider = ProviderKind::Ollama;
        config.switch_model("gemini-2.5-pro").unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
    }

    #[test]
    fn switch_model_sets_active_provider_model() {
        let mut config = with_key();
        config.provider = ProviderKind::Ollama;
        config.switch_model("qwen2.5-coder").unwrap();
        assert_eq!(config.ollama_model, "qwen2.5-coder");
        assert_eq!(config.current_model(), "qwen2.5-coder");
    }

    #[test]
    fn switch_model_rejects_empty() {
        let mut config = with_key();
        assert!(config.switch_model("  ").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "provider = \"ollama\"\nollama_model = \"mistral\"\nsliding_window_size = 6\n",
        )
        .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.current_model(), "mistral");
        assert_eq!(config.sliding_window_size, 6);
    }
}
