//! Configuration loading and management for pagesumm.
//!
//! Loads settings from an optional `pagesumm.toml` with environment variable
//! overrides for the API key and server port. The resulting [`Config`] is built
//! once at start-up and handed to the pipeline and front ends.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the completion API credential
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding the web server port
pub const PORT_ENV: &str = "PORT";

const CONFIG_FILE_NAME: &str = "pagesumm.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("{0} not configured.")]
    MissingApiKey(String),
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

/// Completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Default model identifier, used when a request names none
    pub model: String,
    /// Base URL of an OpenAI-compatible API (the `/chat/completions` path is appended)
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Number of characters of extracted text sent with the prompt
    pub prompt_budget: usize,
    /// Timeout for the completion call; unset means wait indefinitely
    pub timeout_secs: Option<u64>,
}

/// API keys configuration (normally loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
}

/// Page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Request timeout; `None` or `0` means unbounded
    pub timeout_secs: Option<u64>,
}

/// Exported document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory where documents are written and served from
    pub dir: PathBuf,
    /// Keep only the newest N documents
    pub retain: Option<usize>,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from the default
    /// locations when `path` is `None`. Environment overrides are applied last.
    ///
    /// Without an explicit path a missing config file is not an error; the
    /// built-in defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::find_config_file() {
                Some(found) => Self::load_from(&found)?,
                None => Config::default(),
            },
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific path, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api.key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: PORT_ENV.to_string(),
                value: port.clone(),
            })?;
        }

        Ok(())
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("pagesumm").join(CONFIG_FILE_NAME);
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }
}

impl ApiConfig {
    /// Get the completion API key
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingApiKey(API_KEY_ENV.to_string()))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            temperature: 0.5,
            prompt_budget: 4000,
            timeout_secs: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: Some(10),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            retain: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("app.log"),
        }
    }
}
