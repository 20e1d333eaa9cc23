//! Intake Validator — trusted verdicts over untrusted document extractions.
//!
//! Guards against three failure families before anything reaches a rolling
//! summary: documents that genuinely are not medical, extraction output that
//! is boilerplate/disclaimer filler rather than content, and degenerate
//! output (too short, runaway, or garbled). Pure over its inputs plus the
//! fixed rule table — no I/O, no side effects.

pub mod rules;
pub mod types;

pub use rules::{is_supported_media_type, RuleOutcome, INTAKE_RULES, SUPPORTED_MEDIA_TYPES};
pub use types::{DocumentExtraction, IntakeContext, Metric, ValidationVerdict};

use std::path::Path;

/// Run the ordered rule table over one extraction and produce a verdict.
///
/// First terminal outcome wins. The table ends with a terminal
/// secondary-evidence rule, so the trailing rejection is unreachable in
/// practice and exists only as a closed-world default.
pub fn validate(ctx: &IntakeContext) -> ValidationVerdict {
    for rule in INTAKE_RULES {
        match (rule.check)(ctx) {
            RuleOutcome::Continue => {}
            RuleOutcome::Reject { reason } => {
                tracing::info!(rule = rule.name, %reason, "document extraction rejected");
                return ValidationVerdict::rejected(reason, ctx.extraction);
            }
            RuleOutcome::Accept => {
                tracing::debug!(rule = rule.name, "document extraction accepted");
                return ValidationVerdict::accepted(ctx.extraction);
            }
        }
    }

    ValidationVerdict::rejected(rules::REASON_NO_MEDICAL_EVIDENCE.to_string(), ctx.extraction)
}

/// Guess the declared media type for an upload from its file name.
/// Callers that receive a real Content-Type should prefer that instead.
pub fn media_type_for_path(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first_raw().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REJECTED_CATEGORY;
    use crate::intake::rules::{
        REASON_CONTENT_UNAVAILABLE, REASON_MALFORMED, REASON_SUMMARY_TOO_SHORT,
        REASON_UNSUPPORTED_MEDIA,
    };

    fn well_formed_extraction() -> DocumentExtraction {
        DocumentExtraction {
            is_medical_document: Some(true),
            overall_summary: "Complete blood count from 2026-03-01; all values within range."
                .into(),
            key_metrics: vec![Metric {
                name: "Hemoglobin".into(),
                value: "13.5".into(),
                unit: Some("g/dL".into()),
                normal_range: Some("12-16".into()),
                date: Some("2026-03-01".into()),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn well_formed_pdf_extraction_accepted() {
        let extraction = well_formed_extraction();
        let verdict = validate(&IntakeContext {
            media_type: "application/pdf",
            content_retrieved: true,
            extraction: &extraction,
        });
        assert!(verdict.accepted);
        assert_eq!(verdict.sanitized.key_metrics.len(), 1);
    }

    #[test]
    fn unsupported_media_rejected_before_anything_else() {
        // Even a perfect extraction is rejected for an unsupported upload.
        let extraction = well_formed_extraction();
        let verdict = validate(&IntakeContext {
            media_type: "application/x-msdownload",
            content_retrieved: true,
            extraction: &extraction,
        });
        assert_eq!(verdict.reason.as_deref(), Some(REASON_UNSUPPORTED_MEDIA));
    }

    #[test]
    fn fetch_failure_rejected() {
        let extraction = well_formed_extraction();
        let verdict = validate(&IntakeContext {
            media_type: "application/pdf",
            content_retrieved: false,
            extraction: &extraction,
        });
        assert_eq!(verdict.reason.as_deref(), Some(REASON_CONTENT_UNAVAILABLE));
    }

    // Scenario: two-character summary with no other evidence.
    #[test]
    fn too_short_summary_rejected_with_matching_sanitized_text() {
        let extraction = DocumentExtraction { overall_summary: "ok".into(), ..Default::default() };
        let verdict = validate(&IntakeContext {
            media_type: "application/pdf",
            content_retrieved: true,
            extraction: &extraction,
        });
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason.as_deref(), Some(REASON_SUMMARY_TOO_SHORT));
        assert_eq!(verdict.sanitized.overall_summary, REASON_SUMMARY_TOO_SHORT);
        assert!(verdict.sanitized.key_metrics.is_empty());
        assert!(verdict.sanitized.identified_conditions.is_empty());
        assert!(verdict.sanitized.mentioned_medications.is_empty());
    }

    // Scenario: boilerplate phrase appearing twice overrides good metrics.
    #[test]
    fn repeated_disclaimer_phrase_rejects_despite_metrics() {
        let mut extraction = well_formed_extraction();
        extraction.is_medical_document = None;
        extraction.overall_summary = "Consult with a medical expert about these results. \
                                      Always consult with a medical expert first."
            .into();
        let verdict = validate(&IntakeContext {
            media_type: "application/pdf",
            content_retrieved: true,
            extraction: &extraction,
        });
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason.as_deref(), Some(REASON_MALFORMED));
    }

    #[test]
    fn explicit_negative_verdict_wins_over_secondary_evidence() {
        let extraction = DocumentExtraction {
            is_medical_document: Some(false),
            rejection_reason: Some("Photo of a cat.".into()),
            overall_summary: "Photo of a cat sitting on a windowsill.".into(),
            identified_conditions: vec!["stray claim".into()],
            ..Default::default()
        };
        let verdict = validate(&IntakeContext {
            media_type: "image/jpeg",
            content_retrieved: true,
            extraction: &extraction,
        });
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason.as_deref(), Some("Photo of a cat."));
        assert!(verdict.sanitized.identified_conditions.is_empty());
    }

    #[test]
    fn rejection_always_forces_rejected_category() {
        let extraction = DocumentExtraction {
            overall_summary: "ok".into(),
            suggested_category: Some("lab_report".into()),
            ..Default::default()
        };
        let verdict = validate(&IntakeContext {
            media_type: "application/pdf",
            content_retrieved: true,
            extraction: &extraction,
        });
        assert_eq!(verdict.sanitized.suggested_category.as_deref(), Some(REJECTED_CATEGORY));
    }

    #[test]
    fn media_type_guessed_from_extension() {
        assert_eq!(
            media_type_for_path(Path::new("results/cbc_2026.pdf")).as_deref(),
            Some("application/pdf")
        );
        assert_eq!(media_type_for_path(Path::new("notes")), None);
    }
}
