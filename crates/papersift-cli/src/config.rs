//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for papersift
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub eutils: EutilsConfig,
    pub http: HttpConfig,
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EutilsConfig {
    pub base_url: String,
    pub max_results: usize,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
    pub tool: String,
    pub email: Option<String>,
}

impl Default for EutilsConfig {
    fn default() -> Self {
        let defaults = papersift_pubmed::Config::default();
        Self {
            base_url: defaults.base_url,
            max_results: defaults.max_results,
            api_key: std::env::var("NCBI_API_KEY").ok(),
            tool: defaults.tool,
            email: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout: u64,
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Whole-word, case-insensitive terms marking a non-academic affiliation
    pub indicators: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            indicators: papersift_pubmed::DEFAULT_INDICATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Field delimiter for file output
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./papersift.toml (current directory)
    /// 2. ~/.config/papersift/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("papersift.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "papersift") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Pipeline settings for `papersift-pubmed`.
    pub fn pubmed(&self, max_results: Option<usize>) -> papersift_pubmed::Config {
        papersift_pubmed::Config {
            base_url: self.eutils.base_url.clone(),
            max_results: max_results.unwrap_or(self.eutils.max_results),
            api_key: self.eutils.api_key.clone(),
            tool: self.eutils.tool.clone(),
            email: self.eutils.email.clone(),
            indicators: self.classifier.indicators.clone(),
        }
    }
}
