//! Lenient parsing of the document-extraction response.
//!
//! Local models wrap JSON in code fences, prepend chatter, or emit bare
//! objects depending on quantization and mood. Locate the JSON payload
//! first, then deserialize strictly into the extraction contract.

use crate::intake::DocumentExtraction;

use super::SynthesisError;

/// Parse the backend's document-extraction response.
pub fn parse_extraction_response(response: &str) -> Result<DocumentExtraction, SynthesisError> {
    let payload = locate_json(response)
        .ok_or_else(|| SynthesisError::ResponseParsing("no JSON object found".into()))?;

    serde_json::from_str(payload).map_err(|e| SynthesisError::ResponseParsing(e.to_string()))
}

/// Find the JSON payload: a ```json fenced block if present, otherwise the
/// outermost brace-delimited span.
fn locate_json(response: &str) -> Option<&str> {
    if let Some(fence_start) = response.find("```json") {
        let content_start = fence_start + "```json".len();
        if let Some(fence_len) = response[content_start..].find("```") {
            return Some(response[content_start..content_start + fence_len].trim());
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end > start {
        Some(response[start..=end].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "isMedicalDocument": true,
        "overallSummary": "CBC panel, values within range.",
        "keyMetrics": [{"name": "WBC", "value": "6.2", "unit": "10^9/L"}],
        "identifiedConditions": [],
        "mentionedMedications": ["ferrous sulfate"]
    }"#;

    #[test]
    fn parses_bare_json() {
        let extraction = parse_extraction_response(BODY).unwrap();
        assert_eq!(extraction.is_medical_document, Some(true));
        assert_eq!(extraction.key_metrics[0].name, "WBC");
    }

    #[test]
    fn parses_fenced_json_with_chatter() {
        let response = format!("Here is the analysis:\n```json\n{BODY}\n```\nHope this helps!");
        let extraction = parse_extraction_response(&response).unwrap();
        assert_eq!(extraction.mentioned_medications, vec!["ferrous sulfate".to_string()]);
    }

    #[test]
    fn parses_unfenced_json_with_prefix() {
        let response = format!("Sure! {BODY}");
        assert!(parse_extraction_response(&response).is_ok());
    }

    #[test]
    fn rejects_response_without_json() {
        let err = parse_extraction_response("I could not read the document.").unwrap_err();
        assert!(matches!(err, SynthesisError::ResponseParsing(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_extraction_response("{\"overallSummary\": }").unwrap_err();
        assert!(matches!(err, SynthesisError::ResponseParsing(_)));
    }
}
