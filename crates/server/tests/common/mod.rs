//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port with its upstream model
//! endpoints pointed at an `httpmock::MockServer`.

// Allow unused code because not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::json;
use sqlrag::DdlIndexer;
use sqlrag_server::{
    config, router,
    state::{build_app_state_with, AppState, Services},
};
use std::{
    fs,
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};
use tempfile::{tempdir, TempDir};
use tokio::net::TcpListener;

pub const SYSTEM_PROMPT: &str = "You are a MySQL expert. Answer with a single SQL statement.";
pub const USERS_DDL: &str = "CREATE TABLE users (id INT, name TEXT);";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    /// The store, embedder and prompt manager the running server shares.
    pub services: Services,
    pub prompt_path: PathBuf,
    config_dir: TempDir,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with the base configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with("").await
    }

    /// Spawns the server with extra top-level YAML keys appended to the base configuration.
    pub async fn spawn_with(extra_config: &str) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let config_dir = tempdir()?;
        let prompt_path = config_dir.path().join("system.txt");
        fs::write(&prompt_path, SYSTEM_PROMPT)?;

        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_url: ":memory:"
collection: "ddl"
system_prompt_path: "{}"
prompt_watch: poll
prompt_poll_interval_ms: 50
embedding:
  provider: ollama
  api_url: "{}"
  model_name: "mock-embed"
generation:
  provider: ollama
  api_url: "{}"
  model_name: "mock-llm"
{extra_config}
"#,
            prompt_path.display(),
            mock_server.url("/api/embeddings"),
            mock_server.url("/api/generate"),
        );
        fs::write(&config_path, config_content)?;

        let config = config::get_config(config_path.to_str())?;
        let services = Services::from_config(&config).await?;
        let app_state = build_app_state_with(config, &services)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let app = router::create_router(app_state.clone());
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state,
            services,
            prompt_path,
            config_dir,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Answers every embedding request with the same vector.
    pub async fn mock_embeddings(&self) -> Mock<'_> {
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embeddings");
                then.status(200)
                    .json_body(json!({ "embedding": [0.1, 0.2, 0.3, 0.4] }));
            })
            .await
    }

    /// Answers every generation request with `response`.
    pub async fn mock_generation(&self, response: &str) -> Mock<'_> {
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200)
                    .json_body(json!({ "model": "mock-llm", "response": response, "done": true }));
            })
            .await
    }

    /// Writes `ddl` to a file and indexes it into the configured collection.
    pub async fn index_ddl(&self, ddl: &str) -> Result<usize> {
        let ddl_path = self.config_dir.path().join("ddl.sql");
        fs::write(&ddl_path, ddl)?;
        let indexer = DdlIndexer::new(self.services.embedder.clone(), self.services.store.clone());
        Ok(indexer
            .index(&ddl_path, &self.app_state.config.collection)
            .await?)
    }

    pub async fn post_question(&self, question: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/query"))
            .json(&json!({ "question": question }))
            .send()
            .await?)
    }

    /// Waits until the server has picked up `expected` as its system prompt.
    pub async fn wait_for_prompt(&self, expected: &str) -> bool {
        for _ in 0..100 {
            if self.services.prompts.current().as_ref() == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
