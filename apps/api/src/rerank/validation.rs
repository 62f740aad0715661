//! Response validation — turns raw model text into a `RankedResult` that honors the
//! output contract, whatever shape the model actually produced.

use serde_json::{Map, Value};
use tracing::warn;

use crate::catalog::fields::{classify_flag, normalize_test_types, parse_duration, UNKNOWN};
use crate::catalog::SupportFlag;
use crate::errors::AppError;
use crate::llm_client::strip_json_fences;
use crate::rerank::candidate::SanitizedCandidate;
use crate::rerank::{RankedResult, RecommendedAssessment};

pub const RESULT_KEY: &str = "recommended_assessments";

/// Parses model output (optionally fenced) and post-validates every entry.
///
/// - invalid JSON → `ExternalService`
/// - not an object, or missing/non-list `recommended_assessments` → `ResponseShape`
/// - non-object entries are dropped; the rest get `validate_assessment`
/// - at most `max_results` entries are kept, in model order
///
/// `candidates` are the records the model was shown; their flags back-fill
/// entries whose support flags are missing or unreadable.
pub fn parse_rerank_response(
    text: &str,
    max_results: usize,
    missing_url: &str,
    candidates: &[SanitizedCandidate],
) -> Result<RankedResult, AppError> {
    let body = strip_json_fences(text);
    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        AppError::ExternalService(format!("Error in reranking: model returned invalid JSON: {e}"))
    })?;

    let entries = match parsed.get(RESULT_KEY) {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(AppError::ResponseShape(format!(
                "Invalid response format: {RESULT_KEY} is not a list"
            )))
        }
        None => {
            return Err(AppError::ResponseShape(format!(
                "Invalid response format: missing {RESULT_KEY} key"
            )))
        }
    };

    let mut recommended = Vec::with_capacity(entries.len().min(max_results));
    for entry in entries {
        match entry {
            Value::Object(obj) => {
                recommended.push(validate_assessment(obj, missing_url, candidates))
            }
            other => warn!("Dropping non-object recommendation from model output: {other}"),
        }
    }
    if recommended.len() > max_results {
        warn!(
            "Model returned {} recommendations; keeping the first {max_results}",
            recommended.len()
        );
        recommended.truncate(max_results);
    }

    Ok(RankedResult {
        recommended_assessments: recommended,
    })
}

/// Restores the six-field contract on one model-produced object.
///
/// Support flags are always "Yes" or "No": the model's value when it reads as a
/// flag, else the matching candidate's flag, else "No".
pub fn validate_assessment(
    obj: &Map<String, Value>,
    missing_url: &str,
    candidates: &[SanitizedCandidate],
) -> RecommendedAssessment {
    let url = match obj.get("url") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => missing_url.to_string(),
    };
    let source = candidates.iter().find(|c| c.url == url);

    RecommendedAssessment {
        adaptive_support: flag_field(
            obj.get("adaptive_support"),
            source.map(|c| c.adaptive_support.as_str()),
        ),
        remote_support: flag_field(
            obj.get("remote_support"),
            source.map(|c| c.remote_support.as_str()),
        ),
        url,
        description: text_field(obj.get("description")),
        duration: duration_field(obj.get("duration")),
        test_type: test_type_field(obj.get("test_type")),
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn flag_field(value: Option<&Value>, fallback: Option<&str>) -> String {
    let from_model = match value {
        Some(Value::String(s)) if !s.trim().is_empty() => classify_flag(s),
        Some(Value::Bool(true)) => Some(SupportFlag::Yes),
        Some(Value::Bool(false)) => Some(SupportFlag::No),
        Some(Value::Number(n)) => classify_flag(&n.to_string()),
        _ => None,
    };
    from_model
        .or_else(|| fallback.and_then(classify_flag))
        .unwrap_or_default()
        .as_str()
        .to_string()
}

/// Integer minutes or unknown. Unknown never becomes 0.
fn duration_field(value: Option<&Value>) -> Option<u32> {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|m| u32::try_from(m).ok())
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f.round() as u32)
            }),
        Some(Value::String(s)) => parse_duration(s),
        _ => None,
    }
}

fn test_type_field(value: Option<&Value>) -> Vec<String> {
    let raw = match value {
        None | Some(Value::Null) => vec![UNKNOWN.to_string()],
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
    };
    normalize_test_types(raw)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const MISSING: &str = "https://www.shl.com/missing-url";

    const RAW: &str = r#"{
        "recommended_assessments": [
            {
                "url": "https://www.shl.com/view/python-new/",
                "adaptive_support": "No",
                "remote_support": "Yes",
                "description": "Python test",
                "duration": 11,
                "test_type": ["Knowledge & Skills"]
            }
        ]
    }"#;

    #[test]
    fn test_fenced_response_parses_like_unfenced() {
        let fenced = format!("```json\n{RAW}\n```");
        let plain = parse_rerank_response(RAW, 10, MISSING, &[]).unwrap();
        let from_fenced = parse_rerank_response(&fenced, 10, MISSING, &[]).unwrap();
        assert_eq!(plain, from_fenced);
        assert_eq!(plain.recommended_assessments.len(), 1);
        assert_eq!(plain.recommended_assessments[0].duration, Some(11));
    }

    #[test]
    fn test_invalid_json_is_external_service_error() {
        let err = parse_rerank_response("I could not decide, sorry.", 10, MISSING, &[]).unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[test]
    fn test_missing_key_is_response_shape_error() {
        let err = parse_rerank_response(r#"{"results": []}"#, 10, MISSING, &[]).unwrap_err();
        match err {
            AppError::ResponseShape(msg) => assert!(msg.contains("missing recommended_assessments")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_top_level_array_is_response_shape_error() {
        let err = parse_rerank_response("[]", 10, MISSING, &[]).unwrap_err();
        assert!(matches!(err, AppError::ResponseShape(_)));
    }

    #[test]
    fn test_missing_url_and_test_type_are_substituted() {
        let obj = json!({"description": "x"});
        let validated = validate_assessment(obj.as_object().unwrap(), MISSING, &[]);
        assert_eq!(validated.url, MISSING);
        assert_eq!(validated.test_type, vec!["Unknown"]);
        assert_eq!(validated.adaptive_support, "No");
        assert_eq!(validated.remote_support, "No");
    }

    #[test]
    fn test_support_flags_are_always_yes_or_no() {
        let cases = [
            (json!("Yes"), "Yes"),
            (json!("true"), "Yes"),
            (json!(true), "Yes"),
            (json!(1), "Yes"),
            (json!("No"), "No"),
            (json!(false), "No"),
            (json!("Unknown"), "No"),
            (json!("Partially"), "No"),
            (json!(null), "No"),
        ];
        for (raw, expected) in cases {
            let obj = json!({"url": "u", "adaptive_support": raw.clone(), "remote_support": raw.clone()});
            let validated = validate_assessment(obj.as_object().unwrap(), MISSING, &[]);
            assert_eq!(validated.adaptive_support, expected, "adaptive_support {raw}");
            assert_eq!(validated.remote_support, expected, "remote_support {raw}");
        }
    }

    #[test]
    fn test_unreadable_flags_fall_back_to_matching_candidate() {
        let candidate = SanitizedCandidate {
            url: "https://www.shl.com/view/py/".to_string(),
            adaptive_support: "Yes".to_string(),
            remote_support: "Yes".to_string(),
            description: "Python test".to_string(),
            duration: Some(20),
            test_type: vec!["Knowledge & Skills".to_string()],
        };
        let obj = json!({"url": "https://www.shl.com/view/py/", "adaptive_support": "Unknown", "remote_support": "No"});
        let validated = validate_assessment(obj.as_object().unwrap(), MISSING, &[candidate.clone()]);
        assert_eq!(validated.adaptive_support, "Yes");
        assert_eq!(validated.remote_support, "No");

        let other = json!({"url": "https://www.shl.com/view/other/"});
        let validated = validate_assessment(other.as_object().unwrap(), MISSING, &[candidate]);
        assert_eq!(validated.adaptive_support, "No");
    }

    #[test]
    fn test_scalar_test_type_is_wrapped() {
        let obj = json!({"url": "u", "test_type": "Personality & Behavior"});
        let validated = validate_assessment(obj.as_object().unwrap(), MISSING, &[]);
        assert_eq!(validated.test_type, vec!["Personality & Behavior"]);
    }

    #[test]
    fn test_unknown_duration_never_becomes_zero() {
        for raw in [json!(null), json!("unknown"), json!("Unknown duration"), json!(-5), json!({})] {
            let obj = json!({"url": "u", "duration": raw.clone()});
            let validated = validate_assessment(obj.as_object().unwrap(), MISSING, &[]);
            assert_eq!(validated.duration, None, "duration {raw} should be unknown");
        }
        let obj = json!({"url": "u"});
        assert_eq!(validate_assessment(obj.as_object().unwrap(), MISSING, &[]).duration, None);
    }

    #[test]
    fn test_duration_coercions() {
        let cases = [(json!(30), Some(30)), (json!("45 minutes"), Some(45)), (json!(12.0), Some(12)), (json!(0), Some(0))];
        for (raw, expected) in cases {
            let obj = json!({"url": "u", "duration": raw});
            assert_eq!(validate_assessment(obj.as_object().unwrap(), MISSING, &[]).duration, expected);
        }
    }

    #[test]
    fn test_output_is_truncated_and_non_objects_dropped() {
        let entries: Vec<Value> = (0..15)
            .map(|i| json!({"url": format!("https://www.shl.com/{i}")}))
            .chain(std::iter::once(json!("stray")))
            .collect();
        let text = json!({ "recommended_assessments": entries }).to_string();
        let result = parse_rerank_response(&text, 10, MISSING, &[]).unwrap();
        assert_eq!(result.recommended_assessments.len(), 10);
        assert_eq!(result.recommended_assessments[0].url, "https://www.shl.com/0");
    }

    #[test]
    fn test_numeric_url_kept_for_later_repair() {
        let obj = json!({"url": 1234});
        assert_eq!(validate_assessment(obj.as_object().unwrap(), MISSING, &[]).url, "1234");
    }
}
