//! # Configuration Tests
//!
//! Layering of defaults, the YAML file and environment overrides. Tests touching
//! the environment run serially.

use serial_test::serial;
use sqlrag::{providers::ai::EmbeddingApi, providers::factory::GenerationApi, WatchMode};
use sqlrag_server::config::{get_config, ConfigError, PromptWatch};
use std::{env, fs, time::Duration};
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "PORT",
    "DB_URL",
    "SQLRAG_TEST_DB",
    "SQLRAG_PORT",
    "SQLRAG_TOP_K",
    "SQLRAG_STRICT_VALIDATION",
    "SQLRAG_CORS_ORIGINS",
    "SQLRAG_GENERATION__MODEL_NAME",
    "SQLRAG_GENERATION__TEMPERATURE",
    "SQLRAG_EMBEDDING__PROVIDER",
    "SQLRAG_EMBEDDING__API_URL",
];

/// Clears every variable the tests set, so each starts from a clean slate.
fn clear_env_vars() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, contents).unwrap();
    let path = path.to_str().unwrap().to_string();
    (dir, path)
}

#[test]
#[serial]
fn test_get_config_defaults() {
    clear_env_vars();
    let (_dir, path) = write_config("collection: ddl\n");

    let config = get_config(Some(&path)).expect("Configuration should load successfully");

    assert_eq!(config.port, 8000);
    assert_eq!(config.db_url, "db/sqlrag.db");
    assert_eq!(config.collection, "ddl");
    assert_eq!(config.top_k, 4);
    assert!(!config.strict_validation);
    assert_eq!(config.generation_timeout(), None);
    assert_eq!(
        config.cors_origins,
        vec!["http://localhost:8080", "http://127.0.0.1:8080"]
    );
    assert_eq!(config.system_prompt_path, None);
    assert_eq!(config.prompt_watch, PromptWatch::Notify);
    assert_eq!(config.watch_mode(), WatchMode::Notify);
    assert_eq!(config.embedding.provider, EmbeddingApi::Ollama);
    assert_eq!(config.embedding.model_name, "nomic-embed-text");
    assert_eq!(config.generation.provider, GenerationApi::Ollama);
    assert_eq!(config.generation.model_name, "llama3:8b");
    assert_eq!(config.generation.temperature, 0.0);
}

#[test]
#[serial]
fn test_get_config_from_file_with_substitution() {
    clear_env_vars();
    env::set_var("SQLRAG_TEST_DB", "/data/index.db");
    let (_dir, path) = write_config(
        r#"
port: 9001
db_url: "${SQLRAG_TEST_DB}"
collection: "schema"
top_k: 6
strict_validation: true
generation_timeout_secs: 30
cors_origins: ["https://app.example.com"]
system_prompt_path: "/etc/sqlrag/system.txt"
prompt_watch: poll
prompt_poll_interval_ms: 250
embedding:
  provider: openai
  api_url: "http://localhost:1234/v1/embeddings"
  model_name: "text-embedding-3-small"
  api_key: "secret"
generation:
  provider: local
  api_url: "http://localhost:1234/v1/chat/completions"
  model_name: "qwen"
  temperature: 0.2
"#,
    );

    let config = get_config(Some(&path)).unwrap();

    assert_eq!(config.port, 9001);
    assert_eq!(config.db_url, "/data/index.db");
    assert_eq!(config.collection, "schema");
    assert_eq!(config.top_k, 6);
    assert!(config.strict_validation);
    assert_eq!(config.generation_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.cors_origins, vec!["https://app.example.com"]);
    assert_eq!(
        config.system_prompt_path.as_deref(),
        Some("/etc/sqlrag/system.txt")
    );
    assert_eq!(
        config.watch_mode(),
        WatchMode::Poll {
            interval: Duration::from_millis(250)
        }
    );
    assert_eq!(config.embedding.provider, EmbeddingApi::OpenAi);
    assert_eq!(config.embedding.api_key.as_deref(), Some("secret"));
    assert_eq!(config.generation.provider, GenerationApi::Local);
    assert_eq!(config.generation.model_name, "qwen");
    assert!((config.generation.temperature - 0.2).abs() < f32::EPSILON);

    // Keys never reach the logs.
    assert!(!format!("{config:?}").contains("secret"));
    clear_env_vars();
}

#[test]
#[serial]
fn test_top_level_env_vars_override_file() {
    clear_env_vars();
    env::set_var("PORT", "9999");
    env::set_var("DB_URL", "/tmp/override.db");
    let (_dir, path) = write_config("port: 9001\ndb_url: \"/data/index.db\"\n");

    let config = get_config(Some(&path)).unwrap();

    assert_eq!(config.port, 9999);
    assert_eq!(config.db_url, "/tmp/override.db");
    clear_env_vars();
}

#[test]
#[serial]
fn test_prefixed_env_vars_override_nested_keys() {
    clear_env_vars();
    env::set_var("SQLRAG_TOP_K", "2");
    env::set_var("SQLRAG_STRICT_VALIDATION", "true");
    env::set_var(
        "SQLRAG_CORS_ORIGINS",
        "http://a.example,http://b.example",
    );
    env::set_var("SQLRAG_GENERATION__MODEL_NAME", "llama3:70b");
    env::set_var("SQLRAG_EMBEDDING__PROVIDER", "openai");
    env::set_var("SQLRAG_EMBEDDING__API_URL", "http://embed.local/v1/embeddings");
    let (_dir, path) = write_config("generation:\n  model_name: \"llama3:8b\"\n");

    let config = get_config(Some(&path)).unwrap();

    assert_eq!(config.top_k, 2);
    assert!(config.strict_validation);
    assert_eq!(
        config.cors_origins,
        vec!["http://a.example", "http://b.example"]
    );
    assert_eq!(config.generation.model_name, "llama3:70b");
    assert_eq!(config.embedding.provider, EmbeddingApi::OpenAi);
    assert_eq!(
        config.embedding.api_url.as_deref(),
        Some("http://embed.local/v1/embeddings")
    );
    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_config_file_is_an_error() {
    clear_env_vars();

    let result = get_config(Some("/nonexistent/sqlrag/config.yml"));

    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
#[serial]
fn test_zero_timeout_means_no_timeout() {
    clear_env_vars();
    let (_dir, path) = write_config("generation_timeout_secs: 0\n");

    let config = get_config(Some(&path)).unwrap();

    assert_eq!(config.generation_timeout(), None);
}
