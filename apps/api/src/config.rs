use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::catalog::ColumnLayout;

/// Which reranking backend the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerankerBackend {
    /// Generative model via the shared `LlmClient`.
    Llm,
    /// Deterministic similarity blend, no external call.
    Similarity,
}

impl FromStr for RerankerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "similarity" => Ok(Self::Similarity),
            other => bail!("RERANKER must be 'llm' or 'similarity', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: String,
    pub catalog_base_url: String,
    pub catalog_layout: ColumnLayout,
    pub embedding_api_url: String,
    pub embedding_model: String,
    pub embedding_api_key: Option<String>,
    pub embedding_batch_size: usize,
    pub embedding_timeout_secs: u64,
    pub reranker: RerankerBackend,
    pub anthropic_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub retrieval_top_k: usize,
    pub max_recommendations: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let reranker: RerankerBackend = parse_env("RERANKER", RerankerBackend::Llm)?;
        let anthropic_api_key = optional_env("ANTHROPIC_API_KEY");
        if reranker == RerankerBackend::Llm && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set (RERANKER=llm)");
        }

        let config = Config {
            catalog_path: env_or("CATALOG_PATH", "assessments.csv"),
            catalog_base_url: env_or("CATALOG_BASE_URL", "https://www.shl.com")
                .trim_end_matches('/')
                .to_string(),
            catalog_layout: parse_env("CATALOG_LAYOUT", ColumnLayout::Headers)?,
            embedding_api_url: env_or("EMBEDDING_API_URL", "http://localhost:11434/v1/embeddings"),
            embedding_model: env_or("EMBEDDING_MODEL", "all-minilm"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_batch_size: parse_env("EMBEDDING_BATCH_SIZE", 64)?,
            embedding_timeout_secs: parse_env("EMBEDDING_TIMEOUT_SECS", 60)?,
            reranker,
            anthropic_api_key,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 0)?,
            retrieval_top_k: parse_env("RETRIEVAL_TOP_K", 20)?,
            max_recommendations: parse_env("MAX_RECOMMENDATIONS", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        };

        if config.embedding_batch_size == 0 {
            bail!("EMBEDDING_BATCH_SIZE must be greater than zero");
        }
        if config.retrieval_top_k == 0 || config.max_recommendations == 0 {
            bail!("RETRIEVAL_TOP_K and MAX_RECOMMENDATIONS must be greater than zero");
        }

        Ok(config)
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
    }
}
