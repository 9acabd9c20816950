//! # index-ddl
//!
//! Splits a DDL document into chunks, embeds them and stores them as the schema
//! collection the query server retrieves from.

use anyhow::Result;
use clap::Parser;
use sqlrag::{
    constants::{
        DEFAULT_CHUNK_SIZE, DEFAULT_COLLECTION, DEFAULT_DB_FILE, DEFAULT_DDL_FILE,
        DEFAULT_EMBEDDING_MODEL,
    },
    providers::{
        ai::{Embedder, EmbeddingApi},
        db::{sqlite::SqliteProvider, storage::VectorStore},
        factory::{create_embedder, EmbeddingProviderConfig},
    },
    DdlIndexer, DdlSplitter, IndexOptions,
};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(name = "index-ddl", author, version, about, long_about = None)]
struct Cli {
    /// The DDL document to index
    #[arg(long, default_value = DEFAULT_DDL_FILE)]
    ddl_file: PathBuf,
    /// The vector collection to create
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    collection: String,
    /// The SQLite database holding the vector index
    #[arg(long, env = "DB_URL", default_value = DEFAULT_DB_FILE)]
    db_url: String,
    /// Embedding API format: "ollama" or "openai"
    #[arg(long, env = "EMBEDDING_PROVIDER", default_value = "ollama")]
    embedding_provider: EmbeddingApi,
    #[arg(long, env = "EMBEDDING_API_URL")]
    embedding_api_url: Option<String>,
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,
    #[arg(long, env = "EMBEDDING_API_KEY", hide_env_values = true)]
    embedding_api_key: Option<String>,
    /// Maximum chunk length in characters
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    /// Replace the collection if it already exists
    #[arg(long)]
    recreate: bool,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the result line.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let count = index_ddl(&cli).await?;
    println!("Indexed {count} chunks");
    Ok(())
}

async fn index_ddl(cli: &Cli) -> Result<usize> {
    let splitter = DdlSplitter::new(cli.chunk_size)?;

    let embedding_config = EmbeddingProviderConfig {
        provider: cli.embedding_provider,
        api_url: cli.embedding_api_url.clone(),
        model_name: cli.embedding_model.clone(),
        api_key: cli.embedding_api_key.clone(),
    };
    let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&embedding_config)?);

    let store: Arc<dyn VectorStore> = Arc::new(SqliteProvider::new(&cli.db_url).await?);
    info!(db = %cli.db_url, collection = %cli.collection, "Vector index is ready.");

    let indexer = DdlIndexer::new(embedder, store).with_splitter(splitter);
    let count = indexer
        .index_with_options(
            &cli.ddl_file,
            &cli.collection,
            IndexOptions {
                recreate: cli.recreate,
            },
        )
        .await?;
    Ok(count)
}
