//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use truscope_cache::CacheConfig;
use truscope_evidence::CredibilityPolicy;
use truscope_orchestrator::OrchestratorConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Language-model synthesis settings
    #[serde(default)]
    pub ollama: OllamaSettings,

    /// Pipeline thresholds, budgets and retry policy
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Response cache TTLs and capacity
    #[serde(default)]
    pub cache: CacheConfig,

    /// Credibility scoring table and fact-check rating scale
    #[serde(default)]
    pub credibility: CredibilityPolicy,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Where reports and cache snapshots are stored (defaults to `~/.truscope/data`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Ollama synthesizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaSettings {
    /// Ollama API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name; synthesis is statistical-only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".truscope"))
    }

    /// Resolve `--config` or the default path.
    pub fn resolve_path(explicit: Option<&str>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path`, or defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate the embedded library configurations.
    pub fn validate(&self) -> Result<()> {
        self.orchestrator.validate()?;
        self.cache
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        self.credibility
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        if self.ollama.timeout_secs == 0 {
            return Err(CliError::Config("ollama.timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }

    /// Directory for reports and cache snapshots.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.settings.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::home()?.join("data")),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            data_dir: None,
        }
    }
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_endpoint() -> String {
    truscope_llm::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    truscope_llm::ollama::DEFAULT_TIMEOUT_SECS
}
