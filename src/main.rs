use intellitask::api;
use intellitask::config::{CONFIG, Config};
use intellitask::core::assistant::RetrievalAssistant;
use intellitask::core::services::IntelliTaskService;
use intellitask::infrastructure::ai::{
    ChatModel, Embedder,
    openai::{OpenAiChatModel, OpenAiClient, OpenAiEmbedder},
};
use intellitask::infrastructure::storage::{Storage, in_memory::InMemoryStorage, sqlite::SqliteStorage};
use intellitask::infrastructure::vector::{VectorIndex, in_memory::InMemoryVectorIndex, pinecone::PineconeIndex};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn build_assistant(config: &Config) -> Option<RetrievalAssistant> {
    let api_key = config.openai_api_key.as_deref()?;
    let http = reqwest::Client::new();
    let openai = OpenAiClient::new(http.clone(), &config.openai_base_url, api_key);

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(
        openai.clone(),
        &config.embedding_model,
        config.embedding_dimensions,
    ));
    let chat: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(openai, &config.chat_model));
    let index: Arc<dyn VectorIndex> = match config.pinecone() {
        Some((host, key)) => {
            info!(host, "using Pinecone vector index");
            Arc::new(PineconeIndex::new(http, host, key))
        }
        None => {
            info!("using in-memory vector index");
            Arc::new(InMemoryVectorIndex::new())
        }
    };

    Some(RetrievalAssistant::new(embedder, index, chat, config.retrieval_top_k))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let filter = EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    CONFIG.validate()?;
    info!(config = ?*CONFIG, "configuration loaded");
    if CONFIG.jwt_secret.is_none() {
        warn!("JWT_SECRET is not set; signing tokens with the development secret");
    }

    let storage: Arc<dyn Storage> = if CONFIG.uses_in_memory_storage() {
        info!("using in-memory storage");
        Arc::new(InMemoryStorage::new())
    } else {
        info!("using sqlite storage");
        Arc::new(SqliteStorage::connect(&CONFIG.database_url).await?)
    };

    let mut service = IntelliTaskService::new(storage, CONFIG.jwt_secret());
    match build_assistant(&CONFIG) {
        Some(assistant) => service = service.with_assistant(assistant),
        None => warn!("OPENAI_API_KEY is not set; chat assistant disabled"),
    }

    let app = api::app(Arc::new(service));

    // Start server
    let addr: SocketAddr = format!("{}:{}", CONFIG.host, CONFIG.port).parse()?;
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
