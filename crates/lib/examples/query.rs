use dotenvy::dotenv;
use sqlrag::{
    constants::{DEFAULT_COLLECTION, DEFAULT_DB_FILE},
    providers::{
        ai::Embedder,
        db::{sqlite::SqliteProvider, storage::VectorStore},
        factory::{
            create_ai_provider, create_embedder, EmbeddingProviderConfig, GenerationProviderConfig,
        },
    },
    ContextRetriever, PromptManager, QueryPipeline,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging and load .env file
    tracing_subscriber::fmt::init();
    dotenv().ok();

    // --- Command-line argument parsing ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} '<question>'", args[0]);
        eprintln!();
        eprintln!("Example: {} 'How many orders did each user place?'", args[0]);
        eprintln!("Index the schema first with `index-ddl`; Ollama must be running locally.");
        return Ok(());
    }
    let question = &args[1];

    // --- Configuration from environment variables ---
    let db_url = env::var("DB_URL").unwrap_or_else(|_| DEFAULT_DB_FILE.to_string());
    let mut generation = GenerationProviderConfig::default();
    if let Ok(model) = env::var("GENERATION_MODEL") {
        generation.model_name = model;
    }

    // --- Build the pipeline ---
    let store: Arc<dyn VectorStore> = Arc::new(SqliteProvider::new(&db_url).await?);
    let embedder: Arc<dyn Embedder> =
        Arc::from(create_embedder(&EmbeddingProviderConfig::default())?);
    let retriever = ContextRetriever::new(embedder, store, DEFAULT_COLLECTION);
    let prompts = Arc::new(PromptManager::from_env()?);
    let pipeline = QueryPipeline::new(retriever, prompts, create_ai_provider(&generation)?);

    // --- Execute ---
    match pipeline.handle(question).await {
        Ok(result) => {
            println!("--- Relevant DDL ---");
            println!("{}", result.ddl_context);
            println!("\n--- Generated SQL ---");
            println!("{}", result.sql);
        }
        Err(e) => eprintln!("Error: {e}"),
    }

    Ok(())
}
