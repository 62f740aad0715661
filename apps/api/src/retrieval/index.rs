//! Catalog Index — surrogate-text embeddings computed once, ranked per query by cosine similarity.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{AssessmentRecord, Catalog};
use crate::retrieval::embedding::{Embedder, EmbeddingError};

/// A catalog record paired with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub record: AssessmentRecord,
    pub score: f32,
}

/// Read-only catalog plus one embedding per record, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    catalog: Arc<Catalog>,
    embeddings: Vec<Vec<f32>>,
}

impl CatalogIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Embeds every record's surrogate text, `batch_size` records per request.
    pub async fn build(
        catalog: Arc<Catalog>,
        embedder: &dyn Embedder,
        batch_size: usize,
    ) -> Result<Self, EmbeddingError> {
        let corpus: Vec<String> = catalog.records().iter().map(surrogate_text).collect();
        debug!("Created corpus with {} items", corpus.len());

        let mut embeddings = Vec::with_capacity(corpus.len());
        for batch in corpus.chunks(batch_size.max(1)) {
            let vectors = embedder.embed(batch).await?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: batch.len(),
                    got: vectors.len(),
                });
            }
            embeddings.extend(vectors);
        }

        info!(
            "Catalog index built: {} embeddings (model: {})",
            embeddings.len(),
            embedder.model_name()
        );
        Ok(Self {
            catalog,
            embeddings,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Returns the `min(top_k, len)` records most similar to `query`, best first.
    /// An empty index returns an empty list without calling the embedder.
    pub async fn retrieve(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredCandidate>, EmbeddingError> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut vectors = embedder.embed(&[query.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::CountMismatch {
                expected: 1,
                got: vectors.len(),
            });
        }
        let query_vec = vectors.swap_remove(0);

        let hits = rank_by_similarity(&query_vec, &self.embeddings, top_k);
        debug!("Found {} relevant passages", hits.len());

        Ok(hits
            .into_iter()
            .map(|(idx, score)| ScoredCandidate {
                record: self.catalog.records()[idx].clone(),
                score,
            })
            .collect())
    }
}

/// The text embedded for a record: description plus a readable rendering of its attributes.
pub fn surrogate_text(record: &AssessmentRecord) -> String {
    let duration = match record.duration {
        Some(minutes) => format!("{minutes} minutes"),
        None => "Unknown duration".to_string(),
    };
    format!(
        "{} Test types: {}. Adaptive support: {}. Remote support: {}. Duration: {}.",
        record.description,
        record.test_type.join(", "),
        record.adaptive_support.as_str(),
        record.remote_support.as_str(),
        duration
    )
}

/// Cosine similarity; 0.0 for mismatched lengths, zero vectors, or non-finite results.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot_product / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Scores every embedding against `query` and returns `(index, score)` for the best
/// `top_k`, descending. Equal scores keep their original order.
pub fn rank_by_similarity(query: &[f32], embeddings: &[Vec<f32>], top_k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = embeddings
        .iter()
        .enumerate()
        .map(|(idx, emb)| (idx, cosine_similarity(query, emb)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k.min(embeddings.len()));
    scored
}
