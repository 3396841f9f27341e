//! PlanDraft configuration types and loading

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main PlanDraft configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Prompt composition limits
    pub compose: ComposeConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the LLM credential is present. Call this before any
    /// composition work so a missing key fails fast with a clear message
    /// instead of surfacing mid-stream.
    pub fn validate(&self) -> Result<()> {
        self.llm.api_key().map(|_| ())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .plandraft.yml
        let local_config = PathBuf::from(".plandraft.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/plandraft/plandraft.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("plandraft").join("plandraft.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.api_key_env
            )
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_tokens: 8192,
            timeout_ms: 300_000,
            temperature: 0.7,
        }
    }
}

/// Prompt composition limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Maximum characters each reference document contributes to a prompt
    #[serde(rename = "reference-char-budget")]
    pub reference_char_budget: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            reference_char_budget: 5000,
        }
    }
}
