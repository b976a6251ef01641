//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sleuth.toml` files. API credentials never live here; they are read
//! from the environment at provider selection time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Language model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Research loop settings.
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used when a Google key is present.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Model used when only an OpenAI key is present.
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Temperature for generation; 0.0 keeps outputs deterministic.
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gemini_model: default_gemini_model(),
            openai_model: default_openai_model(),
            temperature: 0.0,
            timeout_seconds: default_model_timeout(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_model_timeout() -> u64 {
    120
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum results requested per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            timeout_seconds: default_search_timeout(),
        }
    }
}

fn default_max_results() -> usize {
    3
}

fn default_search_timeout() -> u64 {
    30
}

/// Research loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum refinement cycles before synthesis is forced.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_cycles: default_max_cycles(),
        }
    }
}

fn default_max_cycles() -> usize {
    2
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".sleuth.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Always override: these have defaults in the CLI.
        self.model.temperature = args.temperature;
        self.search.max_results = args.max_results;
        self.agent.max_cycles = args.max_cycles;

        // Timeout - only override if explicitly provided via CLI.
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
            self.search.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
