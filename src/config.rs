//! Application configuration.
//!
//! Settings come from an optional YAML file named by `CONTENT_OPS_CONFIG`,
//! then environment variables override individual keys:
//!
//! | variable | setting |
//! |---|---|
//! | `GOOGLE_API_KEY` / `GEMINI_API_KEY` | `model.api_key` |
//! | `CONTENT_OPS_MODEL` | `model.model` |
//! | `CONTENT_OPS_TIMEOUT_SECS` | `model.timeout_secs` |
//! | `CONTENT_OPS_CAPABILITIES_DIR` | `capabilities_dir` |
//! | `PORT` | `server.port` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llms::base_llm::DEFAULT_TIMEOUT_SECS;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "CONTENT_OPS_CONFIG";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Model provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider name. Empty means "infer from the model id".
    pub provider: String,
    /// Model id, optionally prefixed with a provider (`googleai/gemini-2.0-flash`).
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl ModelConfig {
    /// Provider to use: the explicit setting, else the model id prefix, else `gemini`.
    pub fn resolved_provider(&self) -> String {
        if !self.provider.is_empty() {
            return self.provider.to_lowercase();
        }
        match self.model.split_once('/') {
            Some((prefix, _)) => prefix.to_lowercase(),
            None => "gemini".to_string(),
        }
    }

    /// Model id without any provider prefix.
    pub fn bare_model(&self) -> &str {
        self.model
            .split_once('/')
            .map_or(self.model.as_str(), |(_, name)| name)
    }
}

/// HTTP host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub server: ServerConfig,
    /// Directory of extra capability definitions (YAML).
    pub capabilities_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::from_yaml_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GOOGLE_API_KEY").or_else(|| lookup("GEMINI_API_KEY")) {
            self.model.api_key = Some(key);
        }
        if let Some(model) = lookup("CONTENT_OPS_MODEL") {
            self.model.model = model;
        }
        if let Some(raw) = lookup("CONTENT_OPS_TIMEOUT_SECS") {
            self.model.timeout_secs = parse_value("CONTENT_OPS_TIMEOUT_SECS", &raw)?;
        }
        if let Some(dir) = lookup("CONTENT_OPS_CAPABILITIES_DIR") {
            self.capabilities_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup("PORT") {
            self.server.port = parse_value("PORT", &raw)?;
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
