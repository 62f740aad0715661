// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output. Appended to each
/// service's role line.
pub const JSON_ONLY_RULES: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps the model from inventing identifiers it was not given.
pub const PRESERVE_IDENTIFIERS_INSTRUCTION: &str = "\
    CRITICAL: Preserve the exact URL values from the input. Do NOT modify, shorten, \
    or invent URLs. Only recommend items that appear in the candidate list.";
