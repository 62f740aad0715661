mod catalog;
mod config;
mod errors;
mod llm_client;
mod recommend;
mod rerank;
mod retrieval;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::{load_catalog, Catalog};
use crate::config::{Config, RerankerBackend};
use crate::llm_client::LlmClient;
use crate::recommend::Recommender;
use crate::rerank::{LlmReranker, Reranker, SimilarityReranker};
use crate::retrieval::{CatalogIndex, Embedder, EmbeddingClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Assessment Recommender v{}", env!("CARGO_PKG_VERSION"));

    // Load catalog; an unreadable catalog degrades to an empty one
    let catalog = match load_catalog(
        &config.catalog_path,
        config.catalog_layout,
        &config.catalog_base_url,
    ) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Error loading or cleaning catalog: {e}");
            Catalog::empty()
        }
    };
    if catalog.is_empty() {
        warn!("Catalog is empty; every query will return a no-data error");
    }

    // Initialize embedding client
    let embedder: Arc<dyn Embedder> = Arc::new(
        EmbeddingClient::new(
            config.embedding_api_url.clone(),
            config.embedding_model.clone(),
            config.embedding_api_key.clone(),
            Duration::from_secs(config.embedding_timeout_secs),
        )
        .context("Failed to build embedding HTTP client")?,
    );
    info!("Embedding client initialized (model: {})", embedder.model_name());

    // Embed the catalog once
    let index = match CatalogIndex::build(
        Arc::new(catalog),
        embedder.as_ref(),
        config.embedding_batch_size,
    )
    .await
    {
        Ok(index) => index,
        Err(e) => {
            error!("Failed to embed catalog, serving with an empty index: {e}");
            CatalogIndex::empty()
        }
    };
    info!("Catalog index ready with {} assessments", index.len());

    // Initialize reranker (LlmReranker by default, swap via RERANKER)
    let reranker: Arc<dyn Reranker> = match config.reranker {
        RerankerBackend::Llm => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY is required when RERANKER=llm")?;
            let llm = LlmClient::new(
                api_key,
                Duration::from_secs(config.llm_timeout_secs),
                config.llm_max_retries,
            )
            .context("Failed to build LLM HTTP client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmReranker::new(
                Arc::new(llm),
                config.max_recommendations,
                &config.catalog_base_url,
            ))
        }
        RerankerBackend::Similarity => Arc::new(SimilarityReranker::new(config.max_recommendations)),
    };
    info!("Reranker backend: {}", reranker.backend());

    // Build app state
    let recommender = Recommender::new(
        Arc::new(index),
        embedder,
        reranker,
        config.catalog_base_url.clone(),
        config.retrieval_top_k,
    );
    let state = AppState {
        recommender: Arc::new(recommender),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
