//! Application configuration for BidIQ.
//!
//! Settings are read from `~/.bidiq/bidiq.toml`. Missing sections and keys
//! take built-in defaults, so an absent file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BidIqError, Result};

/// File holding BidIQ settings.
const CONFIG_FILE_NAME: &str = "bidiq.toml";

/// Directory under `$HOME` that holds the settings file.
const CONFIG_DIR_NAME: &str = ".bidiq";

// ---------------------------------------------------------------------------
// Config structs (matching bidiq.toml schema)
// ---------------------------------------------------------------------------

/// Everything `bidiq.toml` can set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenRouter settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Document analysis tuning.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// `[openrouter]`: where and how the model is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Environment variable the API key is read from. The key itself is not stored here.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for RFP analysis.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// API base URL; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Chunk size (characters) used when a document must be bounded.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Largest document (characters) sent to the model in one request.
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,

    /// Retries on rate-limit responses before falling back to heuristics.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in ms; doubles on each retry.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            max_document_chars: default_max_document_chars(),
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

fn default_max_chunk_size() -> usize {
    2000
}
fn default_max_document_chars() -> usize {
    100_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    1000
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bidiq/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BidIqError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bidiq/bidiq.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Read `~/.bidiq/bidiq.toml`, or fall back to defaults when it is absent.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "no settings file, running with defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Parse and validate the settings file at `path`.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BidIqError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BidIqError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Write a settings file populated with defaults and return its path.
///
/// An existing file is overwritten.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BidIqError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BidIqError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BidIqError::io(&path, e))?;
    tracing::info!(?path, "wrote default settings");

    Ok(path)
}

/// Reject values that would make the pipeline misbehave at runtime.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    Url::parse(&config.openrouter.base_url).map_err(|e| {
        BidIqError::config(format!(
            "invalid openrouter.base_url '{}': {e}",
            config.openrouter.base_url
        ))
    })?;

    if config.analysis.max_chunk_size == 0 {
        return Err(BidIqError::config("analysis.max_chunk_size must be positive"));
    }
    if config.analysis.max_document_chars < config.analysis.max_chunk_size {
        return Err(BidIqError::config(
            "analysis.max_document_chars must be at least analysis.max_chunk_size",
        ));
    }
    Ok(())
}

/// Read the OpenRouter API key from the env var named in config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = config.openrouter.api_key_env.as_str();
    match std::env::var(var_name) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_owned()),
        _ => Err(BidIqError::config(format!(
            "no API key in ${var_name}; export it before running an analysis \
             (or run `bidiq extract` for pattern matching without a model)"
        ))),
    }
}
