use crate::config::AppConfig;
use sqlrag::{
    prompts::manager::resolve_prompt_path,
    providers::{
        ai::Embedder,
        db::{sqlite::SqliteProvider, storage::VectorStore},
        factory::{create_ai_provider, create_embedder},
    },
    ContextRetriever, PipelineOptions, PromptManager, QueryPipeline,
};
use std::{path::Path, sync::Arc};
use tracing::info;

/// The shared application state, created once at startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<QueryPipeline>,
}

/// Long-lived handles the query pipeline is assembled from.
#[derive(Clone, Debug)]
pub struct Services {
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub prompts: Arc<PromptManager>,
}

impl Services {
    /// Opens the vector index, builds the embedder and loads the system prompt.
    ///
    /// The prompt watcher is started here, so the text follows the file from now on.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn VectorStore> = Arc::new(SqliteProvider::new(&config.db_url).await?);
        let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.embedding)?);

        let prompt_path =
            resolve_prompt_path(config.system_prompt_path.as_deref().map(Path::new));
        let prompts = Arc::new(PromptManager::load(prompt_path)?);
        prompts.start_watcher(config.watch_mode())?;

        Ok(Self {
            store,
            embedder,
            prompts,
        })
    }
}

/// Builds the shared application state from the configuration.
///
/// Fails if the system prompt cannot be loaded or a provider is misconfigured.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let services = Services::from_config(&config).await?;
    build_app_state_with(config, &services)
}

/// Builds the application state around existing services.
pub fn build_app_state_with(config: AppConfig, services: &Services) -> anyhow::Result<AppState> {
    let ai_provider = create_ai_provider(&config.generation)?;
    let retriever = ContextRetriever::new(
        services.embedder.clone(),
        services.store.clone(),
        &config.collection,
    );
    let pipeline = QueryPipeline::new(retriever, services.prompts.clone(), ai_provider)
        .with_options(PipelineOptions {
            top_k: config.top_k,
            strict_validation: config.strict_validation,
            generation_timeout: config.generation_timeout(),
        });
    info!(
        collection = %config.collection,
        top_k = config.top_k,
        strict_validation = config.strict_validation,
        prompt = %services.prompts.path().display(),
        "Query pipeline ready"
    );

    Ok(AppState {
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
    })
}
