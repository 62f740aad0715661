//! Recommendation pipeline — wires retrieval and reranking for one query.
//!
//! Flow: validate query → retrieve top-K → normalize candidates (test_type, duration,
//!       URL repair) → rerank → URL repair → return.
//!
//! Reranker errors are returned as-is; they are never turned into an empty success.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::fields::normalize_test_types;
use crate::catalog::urls::repair_url;
use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::rerank::{RankedResult, RerankCandidate, Reranker};
use crate::retrieval::{CatalogIndex, Embedder, ScoredCandidate};

pub struct Recommender {
    index: Arc<CatalogIndex>,
    embedder: Arc<dyn Embedder>,
    reranker: Arc<dyn Reranker>,
    base_url: String,
    top_k: usize,
}

impl Recommender {
    pub fn new(
        index: Arc<CatalogIndex>,
        embedder: Arc<dyn Embedder>,
        reranker: Arc<dyn Reranker>,
        base_url: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            reranker,
            base_url: base_url.into(),
            top_k,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.index.catalog()
    }

    pub fn reranker_backend(&self) -> &'static str {
        self.reranker.backend()
    }

    /// Runs the full pipeline for one job description.
    pub async fn recommend(&self, query: &str) -> Result<RankedResult, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::EmptyInput(
                "Please enter a job description".to_string(),
            ));
        }
        if self.index.is_empty() {
            return Err(no_matches());
        }

        let preview: String = query.chars().take(50).collect();
        info!("Processing query: {preview}...");

        let hits = self
            .index
            .retrieve(self.embedder.as_ref(), query, self.top_k)
            .await
            .map_err(|e| AppError::ExternalService(format!("Error retrieving assessments: {e}")))?;
        info!("Retrieved {} assessments", hits.len());

        if hits.is_empty() {
            return Err(no_matches());
        }

        let candidates = prepare_candidates(hits, &self.base_url);
        debug!(
            "Sample candidate being sent to reranker: {:?}",
            candidates.first()
        );

        let result = self
            .reranker
            .rerank(query, candidates)
            .await?
            .repair_urls(&self.base_url);
        info!(
            "Returning {} recommended assessments",
            result.recommended_assessments.len()
        );
        Ok(result)
    }
}

/// Normalizes retrieval output into reranker input: flattens residual encoded
/// `test_type` lists, keeps unknown durations unknown, and repairs URLs.
pub fn prepare_candidates(hits: Vec<ScoredCandidate>, base_url: &str) -> Vec<RerankCandidate> {
    hits.into_iter()
        .map(|hit| {
            let mut candidate = RerankCandidate::from(hit);
            candidate.test_type = Some(normalize_test_types(
                candidate.test_type.take().unwrap_or_default(),
            ));
            candidate.url = Some(repair_url(candidate.url.as_deref(), base_url));
            candidate
        })
        .collect()
}

fn no_matches() -> AppError {
    AppError::EmptyCatalog("No matching assessments found".to_string())
}
