//! Configuration loading, validation, and management for MindMate.
//!
//! Loads configuration from `~/.mindmate/config.toml` with environment
//! variable overrides. Validates all settings at startup. A missing or
//! placeholder API key is fatal before any input is accepted — that check
//! lives in the CLI, backed by [`AppConfig::resolved_api_key`].

use std::path::{Path, PathBuf};

use mindmate_core::persona::Persona;
use serde::{Deserialize, Serialize};

/// Keys starting with this prefix are placeholders pasted from docs, not
/// real credentials.
pub const PLACEHOLDER_KEY_PREFIX: &str = "PASTE";

/// The root configuration structure.
///
/// Maps directly to `~/.mindmate/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max output tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whether to stream replies token-by-token
    #[serde(default = "default_true")]
    pub stream: bool,

    /// Deadline for each completion request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Chat behavior options
    #[serde(default)]
    pub chat: ChatConfig,

    /// Optional external knowledge source
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Extra personas appended to the built-in registry
    #[serde(default)]
    pub personas: Vec<PersonaConfig>,
}

fn default_api_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

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
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("stream", &self.stream)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("chat", &self.chat)
            .field("knowledge", &self.knowledge)
            .field("personas", &self.personas)
            .finish()
    }
}

/// Chat behavior options — each spans a variant divergence in the source
/// family, surfaced as configuration instead of picking one silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Persona active when a session starts
    #[serde(default = "default_persona")]
    pub default_persona: String,

    /// Whether switching persona wipes the transcript
    #[serde(default = "default_true")]
    pub clear_on_persona_switch: bool,

    /// Whether a fresh (or cleared) transcript is seeded with a welcome turn
    #[serde(default = "default_true")]
    pub welcome: bool,

    /// Prompt shipping style: "split" (system + user messages) or
    /// "inline" (one user message carrying everything)
    #[serde(default = "default_prompt_style")]
    pub prompt_style: String,

    /// Assistant turn recorded when the completion API fails
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,

    /// Phrase composed into the prompt when no advice keyword matched.
    /// May be set to "" for the bare-section variant.
    #[serde(default = "default_miss_phrase")]
    pub miss_phrase: String,
}

fn default_persona() -> String {
    "emotional-buddy".into()
}
fn default_prompt_style() -> String {
    "split".into()
}
fn default_fallback_message() -> String {
    "I'm having trouble connecting right now. Please try again.".into()
}
fn default_miss_phrase() -> String {
    "No specific database entry.".into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_persona: default_persona(),
            clear_on_persona_switch: true,
            welcome: true,
            prompt_style: default_prompt_style(),
            fallback_message: default_fallback_message(),
            miss_phrase: default_miss_phrase(),
        }
    }
}

/// Optional external knowledge source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Path to a two-column `question,answer` file. When set, its rows
    /// replace the built-in advice table. An absent file degrades to an
    /// empty table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// An extra persona defined in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub id: String,
    pub display_name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    pub role: String,
    #[serde(default)]
    pub tone: String,
}

fn default_icon() -> String {
    "🤖".into()
}

impl From<PersonaConfig> for Persona {
    fn from(cfg: PersonaConfig) -> Self {
        Persona {
            id: cfg.id,
            display_name: cfg.display_name,
            icon: cfg.icon,
            role: cfg.role,
            tone: cfg.tone,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.mindmate/config.toml).
    ///
    /// Also checks environment variables:
    /// - `MINDMATE_API_KEY` (highest priority)
    /// - `GROQ_API_KEY`
    /// - `OPENAI_API_KEY`
    /// - `MINDMATE_MODEL`, `MINDMATE_API_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("MINDMATE_API_KEY")
                .ok()
                .or_else(|| std::env::var("GROQ_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("MINDMATE_MODEL") {
            config.model = model;
        }

        if let Ok(url) = std::env::var("MINDMATE_API_URL") {
            config.api_url = url;
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
        dirs_home().join(".mindmate")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if !matches!(self.chat.prompt_style.as_str(), "split" | "inline") {
            return Err(ConfigError::ValidationError(format!(
                "chat.prompt_style must be \"split\" or \"inline\", got \"{}\"",
                self.chat.prompt_style
            )));
        }

        Ok(())
    }

    /// The usable API key, if any.
    ///
    /// A key that is empty or still the pasted placeholder counts as
    /// absent — the chat command must halt before accepting input when
    /// this returns `None`.
    pub fn resolved_api_key(&self) -> Option<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() && !key.starts_with(PLACEHOLDER_KEY_PREFIX) => {
                Some(key)
            }
            _ => None,
        }
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            stream: true,
            request_timeout_secs: default_request_timeout_secs(),
            chat: ChatConfig::default(),
            knowledge: KnowledgeConfig::default(),
            personas: vec![],
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

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert!(config.api_url.contains("api.groq.com"));
        assert_eq!(config.max_tokens, 1024);
        assert!(config.chat.clear_on_persona_switch);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.chat.default_persona, config.chat.default_persona);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_prompt_style_rejected() {
        let mut config = AppConfig::default();
        config.chat.prompt_style = "sideways".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().chat.default_persona, "emotional-buddy");
    }

    #[test]
    fn placeholder_key_counts_as_absent() {
        let config = AppConfig {
            api_key: Some("PASTE_KEY_HERE_FOR_LOCAL_ONLY".into()),
            ..AppConfig::default()
        };
        assert!(config.resolved_api_key().is_none());

        let config = AppConfig {
            api_key: Some("   ".into()),
            ..AppConfig::default()
        };
        assert!(config.resolved_api_key().is_none());

        let config = AppConfig {
            api_key: Some("gsk_live_abc123".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.resolved_api_key(), Some("gsk_live_abc123"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("llama-3.3-70b-versatile"));
        assert!(toml_str.contains("emotional-buddy"));
    }

    #[test]
    fn extra_personas_parse_from_toml() {
        let toml_str = r#"
model = "llama-3.3-70b-versatile"

[[personas]]
id = "career-coach"
display_name = "Career Coach"
role = "You are a pragmatic career advisor."
tone = "Be practical."
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.personas.len(), 1);
        assert_eq!(config.personas[0].id, "career-coach");
        assert_eq!(config.personas[0].icon, "🤖"); // default icon

        let persona: Persona = config.personas[0].clone().into();
        assert_eq!(persona.display_name, "Career Coach");
    }

    #[test]
    fn knowledge_file_parses_from_toml() {
        let toml_str = r#"
[knowledge]
file = "/data/advice.csv"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.knowledge.file.as_deref(),
            Some(Path::new("/data/advice.csv"))
        );
    }

    #[test]
    fn load_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"mixtral-8x7b\"\nstream = false\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "mixtral-8x7b");
        assert!(!config.stream);
        // Unspecified fields fall back to defaults
        assert_eq!(config.max_tokens, 1024);
    }
}
