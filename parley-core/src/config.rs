//! Configuration types for Parley
//!
//! A [`ParleyConfig`] is built once at process start and handed to every
//! component that needs it. Nothing in the crate reads configuration from
//! global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ParleyError, Result};

/// Main configuration for Parley
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParleyConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Evaluation harness configuration
    pub eval: EvalConfig,

    /// Model provider configuration
    pub llm: LlmConfig,

    /// Lesson chatbot configuration
    pub chat: ChatConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Whether chat transcripts should be narrated through status updates
    pub fn is_verbose(&self) -> bool {
        matches!(
            self.level.trim().to_ascii_lowercase().as_str(),
            "debug" | "trace"
        )
    }
}

/// Evaluation harness and live session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Interval between heartbeat ticks of a live session
    #[serde(with = "humantime_serde")]
    pub heartbeat_interval: Duration,

    /// Upper bound for a single answer; `None` waits indefinitely
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer_timeout: Option<Duration>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_millis(100),
            answer_timeout: None,
        }
    }
}

/// Model provider configuration
///
/// Only the offline stub provider ships with Parley; applications embedding
/// the library pass their own [`crate::llm::LlmProvider`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// YAML or JSON file with stub answer rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixtures: Option<PathBuf>,

    /// Answer given when no stub rule matches
    pub fallback_answer: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            fixtures: None,
            fallback_answer: "I don't know.".to_string(),
        }
    }
}

/// Lesson chatbot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Replaces the system prompt of the system prompt lesson
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Maximum number of model/tool round trips in the tool calling lesson
    pub max_tool_rounds: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_tool_rounds: 5,
        }
    }
}

/// Builder for ParleyConfig
pub struct ConfigBuilder {
    config: ParleyConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: ParleyConfig::default(),
        }
    }

    /// Set logging configuration
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.config.logging = config;
        self
    }

    /// Set evaluation configuration
    pub fn eval(mut self, config: EvalConfig) -> Self {
        self.config.eval = config;
        self
    }

    /// Set model provider configuration
    pub fn llm(mut self, config: LlmConfig) -> Self {
        self.config.llm = config;
        self
    }

    /// Set lesson chatbot configuration
    pub fn chat(mut self, config: ChatConfig) -> Self {
        self.config.chat = config;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ParleyConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (parley.toml, then the path in PARLEY_CONFIG_PATH)
    /// 3. Environment variable overrides (`PARLEY_EVAL__ANSWER_TIMEOUT=30s`)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is malformed or invalid.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(ParleyConfig::default()))
            .merge(Toml::file("parley.toml"));

        if let Ok(path) = std::env::var("PARLEY_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: ParleyConfig = figment
            .merge(Env::prefixed("PARLEY_").ignore(&["CONFIG_PATH"]).split("__"))
            .extract()
            .map_err(|e| {
                ParleyError::Configuration(format!("Failed to load configuration: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let path = path.as_ref();
        if !path.is_file() {
            return Err(ParleyError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config: ParleyConfig = Figment::from(Serialized::defaults(ParleyConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                ParleyError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.eval.heartbeat_interval.is_zero() {
            return Err(ParleyError::Configuration(
                "eval.heartbeat_interval must be greater than zero".to_string(),
            ));
        }
        if self.eval.answer_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ParleyError::Configuration(
                "eval.answer_timeout must be greater than zero when set".to_string(),
            ));
        }
        if self.chat.max_tool_rounds == 0 {
            return Err(ParleyError::Configuration(
                "chat.max_tool_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
