//! Field-level normalization shared by the loader, the orchestrator, and the reranker.

use tracing::warn;

use crate::catalog::literal::parse_string_list;
use crate::catalog::SupportFlag;

/// Placeholder for absent textual values and absent test types.
pub const UNKNOWN: &str = "Unknown";

const TRUTHY: &[&str] = &["t", "true", "yes", "y", "1"];
const FALSY: &[&str] = &["f", "false", "no", "n", "0", ""];

/// Classifies a raw flag token. `None` means the token is neither truthy nor a known falsy marker.
pub fn classify_flag(token: &str) -> Option<SupportFlag> {
    let token = token.trim().to_ascii_lowercase();
    if TRUTHY.contains(&token.as_str()) {
        Some(SupportFlag::Yes)
    } else if FALSY.contains(&token.as_str()) {
        Some(SupportFlag::No)
    } else {
        None
    }
}

/// Maps a raw flag token to Yes/No. Unrecognized tokens map to No.
pub fn parse_support_flag(token: &str) -> SupportFlag {
    classify_flag(token).unwrap_or(SupportFlag::No)
}

/// Extracts the first run of ASCII digits as minutes. No digits means unknown.
pub fn parse_duration(cell: &str) -> Option<u32> {
    let digits: String = cell
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parses a `test_type` cell into a non-empty ordered list.
///
/// - `['A', 'B']` → `["A", "B"]` (restricted literal parser, never evaluated)
/// - `A` → `["A"]`
/// - empty cell or empty list → `["Unknown"]`
/// - malformed list literal → `[<raw cell>]`
pub fn parse_test_type(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return vec![UNKNOWN.to_string()];
    }
    if !trimmed.starts_with('[') {
        return vec![trimmed.to_string()];
    }
    match parse_string_list(trimmed) {
        Ok(items) => ensure_non_empty(clean(items)),
        Err(e) => {
            warn!("Keeping malformed test_type literal {trimmed:?} as a single value: {e}");
            vec![trimmed.to_string()]
        }
    }
}

/// Flattens any element that is itself an encoded list and guarantees a non-empty result.
pub fn normalize_test_types(test_types: Vec<String>) -> Vec<String> {
    let flattened = test_types
        .into_iter()
        .flat_map(|t| {
            if t.trim_start().starts_with('[') {
                parse_test_type(&t)
            } else {
                vec![t]
            }
        })
        .collect();
    ensure_non_empty(clean(flattened))
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn ensure_non_empty(items: Vec<String>) -> Vec<String> {
    if items.is_empty() {
        vec![UNKNOWN.to_string()]
    } else {
        items
    }
}
