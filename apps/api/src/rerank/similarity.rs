//! Similarity Reranker — deterministic second stage, no external call.
//!
//! score = RETRIEVAL_WEIGHT × retrieval similarity + LEXICAL_WEIGHT × query-term coverage

use std::collections::HashSet;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::rerank::candidate::{sanitize_candidate, RerankCandidate};
use crate::rerank::{no_candidates, RankedResult, RecommendedAssessment, Reranker};

const RETRIEVAL_WEIGHT: f32 = 0.7;
const LEXICAL_WEIGHT: f32 = 0.3;

pub struct SimilarityReranker {
    max_results: usize,
}

impl SimilarityReranker {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }
}

#[async_trait]
impl Reranker for SimilarityReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
    ) -> Result<RankedResult, AppError> {
        if candidates.is_empty() {
            return Err(no_candidates());
        }

        let query_terms = terms(query);
        let mut scored: Vec<(f32, RerankCandidate)> = candidates
            .into_iter()
            .map(|c| (blend_score(&query_terms, &c), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(self.max_results);

        Ok(RankedResult {
            recommended_assessments: scored
                .iter()
                .map(|(_, c)| RecommendedAssessment::from(sanitize_candidate(c)))
                .collect(),
        })
    }

    fn backend(&self) -> &'static str {
        "similarity"
    }
}

fn blend_score(query_terms: &HashSet<String>, candidate: &RerankCandidate) -> f32 {
    let mut text = candidate.description.clone().unwrap_or_default();
    for t in candidate.test_type.iter().flatten() {
        text.push(' ');
        text.push_str(t);
    }
    let retrieval = candidate.retrieval_score.unwrap_or(0.0);
    RETRIEVAL_WEIGHT * retrieval + LEXICAL_WEIGHT * term_coverage(query_terms, &terms(&text))
}

/// Fraction of query terms that also occur in the candidate text.
fn term_coverage(query_terms: &HashSet<String>, text_terms: &HashSet<String>) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let covered = query_terms.intersection(text_terms).count();
    covered as f32 / query_terms.len() as f32
}

/// Lowercased alphanumeric tokens of two or more characters.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}
