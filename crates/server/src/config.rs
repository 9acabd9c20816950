//! # Application Configuration
//!
//! This module defines the configuration structure for the `sqlrag-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use sqlrag::{
    constants::{DEFAULT_COLLECTION, DEFAULT_DB_FILE, DEFAULT_TOP_K},
    prompts::manager::WatchMode,
    providers::factory::{EmbeddingProviderConfig, GenerationProviderConfig},
};
use std::{env, fs, path::Path, time::Duration};
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// How the system prompt file is watched for edits.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptWatch {
    #[default]
    Notify,
    Poll,
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database holding the vector index. Loaded from `DB_URL`.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// The vector collection searched for schema context.
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Reject model output that does not look like a SQL statement.
    #[serde(default)]
    pub strict_validation: bool,
    /// Upper bound on a single generation call. Unset means no limit.
    #[serde(default)]
    pub generation_timeout_secs: Option<u64>,
    /// Browser origins allowed to call the API.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Overrides `RAG_SYSTEM_PROMPT` and the bundled prompt.
    #[serde(default)]
    pub system_prompt_path: Option<String>,
    #[serde(default)]
    pub prompt_watch: PromptWatch,
    #[serde(default = "default_prompt_poll_interval_ms")]
    pub prompt_poll_interval_ms: u64,

    /// Configuration for the text embedding model.
    #[serde(default)]
    pub embedding: EmbeddingProviderConfig,
    /// Configuration for the SQL generation model.
    #[serde(default)]
    pub generation: GenerationProviderConfig,
}

impl AppConfig {
    pub fn watch_mode(&self) -> WatchMode {
        match self.prompt_watch {
            PromptWatch::Notify => WatchMode::Notify,
            PromptWatch::Poll => WatchMode::Poll {
                interval: Duration::from_millis(self.prompt_poll_interval_ms.max(1)),
            },
        }
    }

    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn default_port() -> u16 {
    8000
}

fn default_db_url() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8080".to_string(),
        "http://127.0.0.1:8080".to_string(),
    ]
}

fn default_prompt_poll_interval_ms() -> u64 {
    1000
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// Every key has a default, so the file is optional unless a path is passed
/// explicitly. Environment variables override the file:
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `SQLRAG_...` variables (e.g., `SQLRAG_GENERATION__MODEL_NAME`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder();

    let main_content = match config_path_override {
        Some(path) => Some(
            read_and_substitute(path)?
                .ok_or_else(|| ConfigError::NotFound(format!("Config file not found at '{path}'.")))?,
        ),
        None => {
            let user_config_path = format!("{base_path}/config.yml");
            let content = read_and_substitute(&user_config_path)?;
            if content.is_some() {
                info!("Loading user-defined configuration from '{user_config_path}'.");
            } else {
                info!("'{user_config_path}' not found. Using defaults and environment.");
            }
            content
        }
    };
    if let Some(content) = main_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        // Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("SQLRAG")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors_origins"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
