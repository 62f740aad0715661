//! Candidate sanitization — the exact six-field shape sent to a reranker.

use serde::Serialize;

use crate::catalog::fields::{parse_support_flag, UNKNOWN};
use crate::rerank::RecommendedAssessment;
use crate::retrieval::ScoredCandidate;

/// A retrieved candidate as handed to the reranker. Any field may be absent;
/// `sanitize_candidate` fills the gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerankCandidate {
    pub url: Option<String>,
    pub adaptive_support: Option<String>,
    pub remote_support: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub test_type: Option<Vec<String>>,
    /// Retrieval similarity; never sent to the model.
    pub retrieval_score: Option<f32>,
}

impl From<ScoredCandidate> for RerankCandidate {
    fn from(candidate: ScoredCandidate) -> Self {
        let record = candidate.record;
        Self {
            url: Some(record.url),
            adaptive_support: Some(record.adaptive_support.as_str().to_string()),
            remote_support: Some(record.remote_support.as_str().to_string()),
            description: Some(record.description),
            duration: record.duration,
            test_type: Some(record.test_type),
            retrieval_score: Some(candidate.score),
        }
    }
}

/// Exactly the six contract fields, all present. `duration: None` serializes as an
/// explicit `null`, the unknown-duration sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanitizedCandidate {
    pub url: String,
    pub adaptive_support: String,
    pub remote_support: String,
    pub description: String,
    pub duration: Option<u32>,
    pub test_type: Vec<String>,
}

/// Placeholder flags ("Unknown") become "No" on the way out.
impl From<SanitizedCandidate> for RecommendedAssessment {
    fn from(c: SanitizedCandidate) -> Self {
        Self {
            url: c.url,
            adaptive_support: parse_support_flag(&c.adaptive_support).as_str().to_string(),
            remote_support: parse_support_flag(&c.remote_support).as_str().to_string(),
            description: c.description,
            duration: c.duration,
            test_type: c.test_type,
        }
    }
}

/// Fills absent fields without dropping or renaming any:
/// text → "Unknown", test_type → ["Unknown"], duration → null (never 0).
pub fn sanitize_candidate(candidate: &RerankCandidate) -> SanitizedCandidate {
    let text = |value: &Option<String>| match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    };
    let test_type = match &candidate.test_type {
        Some(types) if !types.is_empty() => types.clone(),
        _ => vec![UNKNOWN.to_string()],
    };

    SanitizedCandidate {
        url: text(&candidate.url),
        adaptive_support: text(&candidate.adaptive_support),
        remote_support: text(&candidate.remote_support),
        description: text(&candidate.description),
        duration: candidate.duration,
        test_type,
    }
}
