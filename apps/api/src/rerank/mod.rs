//! Reranking — pluggable, trait-based second stage over retrieved candidates.
//!
//! `LlmReranker` asks the generative model to reorder and filter; `SimilarityReranker`
//! is a deterministic blend with no external call. `AppState` holds an
//! `Arc<dyn Reranker>`, chosen at startup via `RERANKER`.

pub mod candidate;
pub mod llm;
pub mod prompts;
pub mod similarity;
pub mod validation;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::urls::repair_url;
use crate::errors::AppError;

pub use candidate::RerankCandidate;
pub use llm::LlmReranker;
pub use similarity::SimilarityReranker;

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all reranker backends)
// ────────────────────────────────────────────────────────────────────────────

/// One recommended assessment with the full six-field contract restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAssessment {
    pub url: String,
    pub adaptive_support: String,
    pub remote_support: String,
    pub description: String,
    /// Minutes, or `null` when unknown.
    pub duration: Option<u32>,
    pub test_type: Vec<String>,
}

/// Final ranked list returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub recommended_assessments: Vec<RecommendedAssessment>,
}

impl RankedResult {
    /// Runs every URL through `repair_url`.
    pub fn repair_urls(mut self, base_url: &str) -> Self {
        for assessment in &mut self.recommended_assessments {
            assessment.url = repair_url(Some(&assessment.url), base_url);
        }
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The reranker trait. Implement this to swap backends without touching
/// the orchestrator, handler, or caller code.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Reorders and filters `candidates` for `query`.
    /// Empty `candidates` is an error and must not reach any external service.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
    ) -> Result<RankedResult, AppError>;

    /// "llm" or "similarity", reported in health output and logs.
    fn backend(&self) -> &'static str;
}

/// Error returned by every backend for an empty candidate list.
pub(crate) fn no_candidates() -> AppError {
    AppError::EmptyCatalog("No candidate assessments to rerank".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_urls_applies_to_every_entry() {
        let entry = |url: &str| RecommendedAssessment {
            url: url.to_string(),
            adaptive_support: "No".into(),
            remote_support: "Yes".into(),
            description: "d".into(),
            duration: None,
            test_type: vec!["A".into()],
        };
        let result = RankedResult {
            recommended_assessments: vec![entry("55"), entry(""), entry("https://x.io/a")],
        }
        .repair_urls("https://www.shl.com");

        let urls: Vec<&str> = result
            .recommended_assessments
            .iter()
            .map(|a| a.url.as_str())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://www.shl.com/55",
                "https://www.shl.com/missing-url",
                "https://x.io/a"
            ]
        );
    }

    #[test]
    fn test_ranked_result_serializes_contract_shape() {
        let result = RankedResult {
            recommended_assessments: vec![RecommendedAssessment {
                url: "https://www.shl.com/1".into(),
                adaptive_support: "Yes".into(),
                remote_support: "No".into(),
                description: "d".into(),
                duration: None,
                test_type: vec!["A".into()],
            }],
        };
        let value = serde_json::to_value(&result).unwrap();
        let entry = &value["recommended_assessments"][0];
        assert_eq!(entry.as_object().unwrap().len(), 6);
        assert!(entry["duration"].is_null());
        assert!(entry["test_type"].is_array());
    }
}
