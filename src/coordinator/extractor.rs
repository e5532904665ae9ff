//! Extraction boundary.
//!
//! The extractor (a language model behind some client) turns an utterance
//! into a candidate payload for one domain. Its output arrives as either a
//! JSON value or raw text, possibly fenced in markdown, possibly a JSON
//! string holding JSON, possibly wrapped in the domain's envelope key.
//! `normalize` collapses all of that into one typed `CandidateRecord` so
//! nothing downstream branches on representation.

use std::future::Future;

use chrono::NaiveDate;
use serde_json::Value;

use super::error::ExtractionError;
use crate::models::{Domain, SessionState};
use crate::store::{CandidateRecord, DomainSchema};

/// Nested JSON-in-string layers unwrapped before giving up.
const MAX_STRING_NESTING: usize = 2;

/// What the extractor sees for one turn.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub utterance: &'a str,
    pub domain: Domain,
    pub schema: &'a DomainSchema,
    /// Resolves relative dates ("yesterday") in the utterance.
    pub today: NaiveDate,
    /// State before this turn, for context only.
    pub current: &'a SessionState,
}

/// Raw extractor output, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCandidate {
    Json(Value),
    Text(String),
}

/// Produces candidate payloads from free text.
///
/// `Ok(None)` means the utterance held nothing to record. Implementations
/// must not touch session state; the coordinator merges the result.
pub trait CandidateExtractor: Send + Sync {
    fn extract(
        &self,
        context: ExtractionContext<'_>,
    ) -> impl Future<Output = Result<Option<RawCandidate>, ExtractionError>> + Send;
}

/// Extract a JSON block from model response text.
/// Handles responses that include text before/after the JSON.
pub fn extract_json_block(response: &str) -> Result<&str, ExtractionError> {
    let trimmed = response.trim();

    // Strip markdown code fences if present
    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return Ok(after_fence[..end].trim());
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            if block.starts_with('{') {
                return Ok(block);
            }
        }
    }

    // First { to last }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return Ok(&trimmed[start..=end]);
        }
    }

    Err(ExtractionError::Unparseable(
        "No JSON object found in extractor response".to_string(),
    ))
}

fn is_empty_text(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.eq_ignore_ascii_case("none") || t.eq_ignore_ascii_case("null")
}

fn parse_text(text: &str) -> Result<Value, ExtractionError> {
    let block = extract_json_block(text)?;
    serde_json::from_str(block).map_err(|e| ExtractionError::Unparseable(e.to_string()))
}

/// Normalise raw extractor output into a typed candidate for `domain`.
///
/// Returns `Ok(None)` when the output carries nothing to merge.
pub fn normalize(
    domain: Domain,
    raw: RawCandidate,
) -> Result<Option<CandidateRecord>, ExtractionError> {
    let mut value = match raw {
        RawCandidate::Text(text) if is_empty_text(&text) => return Ok(None),
        RawCandidate::Text(text) => parse_text(&text)?,
        RawCandidate::Json(value) => value,
    };

    for _ in 0..MAX_STRING_NESTING {
        match value {
            Value::String(text) if is_empty_text(&text) => return Ok(None),
            Value::String(text) => value = parse_text(&text)?,
            _ => break,
        }
    }

    match value {
        Value::Null => Ok(None),
        Value::Object(_) => {
            let candidate = CandidateRecord::from_payload(domain, value)
                .map_err(|e| ExtractionError::InvalidEnvelope(e.to_string()))?;
            Ok((!candidate.is_empty()).then_some(candidate))
        }
        other => Err(ExtractionError::InvalidEnvelope(format!(
            "expected an object for {domain}, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_json_block_from_fenced() {
        let input = "Here you go:\n```json\n{\"moods\": []}\n```\nDone.";
        assert_eq!(extract_json_block(input).unwrap(), "{\"moods\": []}");
    }

    #[test]
    fn extract_json_block_from_bare() {
        let input = "Sure! {\"a\": {\"b\": 1}} hope that helps";
        assert_eq!(extract_json_block(input).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn extract_json_block_no_json() {
        assert!(matches!(
            extract_json_block("nothing to see"),
            Err(ExtractionError::Unparseable(_))
        ));
    }

    #[test]
    fn object_and_string_payloads_normalise_identically() {
        let object = json!({"exercise_data": {"daily_activities": [
            {"date": "2025-06-02", "exercise_type": "Yoga", "duration_minutes": 30}
        ]}});
        let from_object = normalize(Domain::Exercise, RawCandidate::Json(object.clone())).unwrap();
        let from_string =
            normalize(Domain::Exercise, RawCandidate::Json(Value::String(object.to_string()))).unwrap();
        let from_text = normalize(
            Domain::Exercise,
            RawCandidate::Text(format!("```json\n{object}\n```")),
        )
        .unwrap();

        assert!(from_object.is_some());
        assert_eq!(from_object, from_string);
        assert_eq!(from_object, from_text);
    }

    #[test]
    fn empty_outputs_are_no_data() {
        assert!(normalize(Domain::Cycle, RawCandidate::Text("  ".into())).unwrap().is_none());
        assert!(normalize(Domain::Cycle, RawCandidate::Text("None".into())).unwrap().is_none());
        assert!(normalize(Domain::Cycle, RawCandidate::Json(Value::Null)).unwrap().is_none());
        assert!(normalize(Domain::Cycle, RawCandidate::Json(json!({"changes": ""}))).unwrap().is_none());
    }

    #[test]
    fn symptom_payload_under_state_key_is_kept() {
        let raw = RawCandidate::Json(json!({"symptom_mood_data": {"symptoms": [
            {"date": "2025-06-01", "symptom_type": "Cramps", "severity": 6}
        ]}}));
        let candidate = normalize(Domain::SymptomMood, raw).unwrap();
        assert!(matches!(
            candidate,
            Some(CandidateRecord::SymptomMood(ref update)) if update.symptoms.items.len() == 1
        ));
    }

    #[test]
    fn garbage_text_is_unparseable() {
        let err = normalize(Domain::Nutrition, RawCandidate::Text("{not: json}".into())).unwrap_err();
        assert!(matches!(err, ExtractionError::Unparseable(_)));
    }

    #[test]
    fn non_object_is_invalid_envelope() {
        let err = normalize(Domain::Nutrition, RawCandidate::Json(json!([1, 2]))).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidEnvelope(_)));

        let err = normalize(
            Domain::Nutrition,
            RawCandidate::Json(json!({"nutrition_data": "lots of water"})),
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidEnvelope(_)));
    }
}
