// LLM prompt constants for the reranking stage.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_RULES;

/// Role line of the rerank system prompt.
pub const RERANK_ROLE: &str = "You are an expert in workplace assessment and talent selection. \
    You rank assessment products by how well they measure what a job requires.";

/// Full rerank system prompt: role plus the shared JSON-only rules.
pub fn rerank_system() -> String {
    format!("{RERANK_ROLE} {JSON_ONLY_RULES}")
}

/// Rerank prompt template.
/// Replace: {query}, {candidates_json}, {max_results}, {preserve_instruction}
pub const RERANK_PROMPT_TEMPLATE: &str = r#"Given a job description, rank the most relevant assessments based on how well they match the job requirements.

Job description: "{query}"

Candidate assessments:
{candidates_json}

{preserve_instruction}

Rank the most relevant assessments and return a JSON object in this EXACT format:
{
  "recommended_assessments": [
    {
      "url": "...",
      "adaptive_support": "Yes/No",
      "remote_support": "Yes/No",
      "description": "...",
      "duration": 30,
      "test_type": ["type1", "type2"]
    }
  ]
}

HARD RULES:
1. Return ONLY the JSON object, with exactly one key: "recommended_assessments"
2. Preserve the exact URL values from the input — do not modify them
3. Include all six fields from the original assessment data for every item
4. Limit to the top {max_results} most relevant assessments, best first
5. "duration" is an integer number of minutes, or null when it is unknown — never guess 0
6. Keep every "test_type" value as an array, even if there is only one type"#;
