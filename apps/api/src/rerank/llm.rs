//! LLM Reranker — the generative model reorders and filters the retrieved candidates.
//!
//! Flow: sanitize → build prompt → generate → strip fences → parse → post-validate.
//! Ordering is whatever the model returns; it is not deterministic.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::catalog::urls::missing_url;
use crate::errors::AppError;
use crate::llm_client::prompts::PRESERVE_IDENTIFIERS_INSTRUCTION;
use crate::llm_client::GenerativeModel;
use crate::rerank::candidate::{sanitize_candidate, RerankCandidate, SanitizedCandidate};
use crate::rerank::prompts::{rerank_system, RERANK_PROMPT_TEMPLATE};
use crate::rerank::validation::parse_rerank_response;
use crate::rerank::{no_candidates, RankedResult, Reranker};

pub struct LlmReranker {
    model: Arc<dyn GenerativeModel>,
    max_results: usize,
    missing_url: String,
    system: String,
}

impl LlmReranker {
    pub fn new(model: Arc<dyn GenerativeModel>, max_results: usize, base_url: &str) -> Self {
        Self {
            model,
            max_results,
            missing_url: missing_url(base_url),
            system: rerank_system(),
        }
    }
}

#[async_trait]
impl Reranker for LlmReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
    ) -> Result<RankedResult, AppError> {
        if candidates.is_empty() {
            return Err(no_candidates());
        }

        info!("Reranking {} candidates", candidates.len());
        let sanitized: Vec<SanitizedCandidate> = candidates.iter().map(sanitize_candidate).collect();
        debug!("Sample candidate: {:?}", sanitized.first());

        let prompt = build_rerank_prompt(query, &sanitized, self.max_results)?;

        let text = self
            .model
            .generate(&prompt, &self.system)
            .await
            .map_err(|e| AppError::ExternalService(format!("Error in reranking: {e}")))?;

        let result = parse_rerank_response(&text, self.max_results, &self.missing_url, &sanitized)?;
        warn_on_unknown_urls(&result, &sanitized);
        Ok(result)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Fills the rerank template with the query and the pretty-printed candidates.
pub fn build_rerank_prompt(
    query: &str,
    candidates: &[SanitizedCandidate],
    max_results: usize,
) -> Result<String, AppError> {
    let candidates_json = serde_json::to_string_pretty(candidates)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize candidates: {e}")))?;

    Ok(RERANK_PROMPT_TEMPLATE
        .replace("{preserve_instruction}", PRESERVE_IDENTIFIERS_INSTRUCTION)
        .replace("{max_results}", &max_results.to_string())
        .replace("{candidates_json}", &candidates_json)
        .replace("{query}", query))
}

/// Logs recommendations whose URL was not among the candidates and returns their
/// count. They are kept.
fn warn_on_unknown_urls(result: &RankedResult, candidates: &[SanitizedCandidate]) -> usize {
    let known: HashSet<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
    let unknown = result
        .recommended_assessments
        .iter()
        .filter(|a| !known.contains(a.url.as_str()))
        .count();
    if unknown > 0 {
        warn!("Reranker returned {unknown} recommendation(s) with URLs not present in the candidates");
    }
    unknown
}
