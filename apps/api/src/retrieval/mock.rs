//! Test doubles for the embedding service.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::catalog::{AssessmentRecord, SupportFlag};
use crate::retrieval::embedding::{Embedder, EmbeddingError};

const VOCABULARY: &[&str] = &[
    "python",
    "sql",
    "java",
    "leadership",
    "manager",
    "backend",
    "engineer",
    "sales",
    "personality",
    "numerical",
];

/// Bag-of-words embedder over a small fixed vocabulary. Deterministic, no network.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; VOCABULARY.len()];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
        {
            if let Some(pos) = VOCABULARY.iter().position(|w| *w == token) {
                vector[pos] += 1.0;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Embedder whose every call fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 503,
            message: "embedding service unavailable".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}

/// A minimal catalog record with the given description.
pub fn record(description: &str) -> AssessmentRecord {
    AssessmentRecord {
        url: format!(
            "https://www.shl.com/view/{}/",
            description.to_lowercase().replace(' ', "-")
        ),
        adaptive_support: SupportFlag::No,
        remote_support: SupportFlag::No,
        description: description.to_string(),
        duration: None,
        test_type: vec!["Knowledge & Skills".to_string()],
    }
}
